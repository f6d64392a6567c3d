use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Read access to the host page's ambient state.
///
/// One implementation wraps a live document; [`StaticPage`] serves saved
/// markup and test fixtures.
pub trait PageInspector: Send + Sync {
    /// Full URL of the page.
    fn location(&self) -> &str;

    /// The player configuration object, when the page exposes one in memory.
    fn player_response(&self) -> Option<Value>;

    /// Bodies of all inline `<script>` elements, in document order.
    fn inline_scripts(&self) -> Vec<String>;

    /// Serialized page markup.
    fn markup(&self) -> String;

    fn title(&self) -> Option<String> {
        None
    }

    /// The page's own transcript UI, if the host page version has one.
    fn transcript_panel(&self) -> Option<&dyn TranscriptPanel> {
        None
    }
}

/// Drives the page's "show transcript" affordance.
#[async_trait]
pub trait TranscriptPanel: Send + Sync {
    /// Locates and activates the affordance. Returns `false` when it is absent.
    async fn open(&self) -> bool;

    /// Text of every rendered transcript segment, in display order.
    async fn segment_texts(&self) -> Vec<String>;

    /// Dismisses the panel opened by [`TranscriptPanel::open`].
    async fn close(&self);
}

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid regex"));
static TITLE_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s+name="title"\s+content="([^"]*)""#).expect("valid regex")
});
static TITLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

/// A page snapshot held in memory.
#[derive(Clone, Default)]
pub struct StaticPage {
    location: String,
    player_response: Option<Value>,
    scripts: Vec<String>,
    markup: String,
    title: Option<String>,
    panel: Option<Arc<dyn TranscriptPanel>>,
}

impl StaticPage {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Builds a snapshot from saved HTML. Inline script bodies and the title
    /// are pulled out of the markup; scripts with a `src` attribute are skipped.
    pub fn from_html(location: impl Into<String>, html: impl Into<String>) -> Self {
        let markup = html.into();
        let scripts = SCRIPT_RE
            .captures_iter(&markup)
            .filter(|c| !c[1].to_ascii_lowercase().contains("src="))
            .map(|c| c[2].to_string())
            .filter(|body| !body.trim().is_empty())
            .collect();
        let title = TITLE_META_RE
            .captures(&markup)
            .or_else(|| TITLE_TAG_RE.captures(&markup))
            .map(|c| c[1].trim().trim_end_matches(" - YouTube").to_string());

        Self {
            location: location.into(),
            scripts,
            title,
            markup,
            ..Default::default()
        }
    }

    pub fn with_player_response(mut self, value: Value) -> Self {
        self.player_response = Some(value);
        self
    }

    pub fn with_script(mut self, body: impl Into<String>) -> Self {
        self.scripts.push(body.into());
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_panel(mut self, panel: Arc<dyn TranscriptPanel>) -> Self {
        self.panel = Some(panel);
        self
    }
}

impl PageInspector for StaticPage {
    fn location(&self) -> &str {
        &self.location
    }

    fn player_response(&self) -> Option<Value> {
        self.player_response.clone()
    }

    fn inline_scripts(&self) -> Vec<String> {
        self.scripts.clone()
    }

    fn markup(&self) -> String {
        self.markup.clone()
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn transcript_panel(&self) -> Option<&dyn TranscriptPanel> {
        self.panel.as_deref()
    }
}
