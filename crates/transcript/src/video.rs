use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::page::PageInspector;

/// Path prefixes that carry the video identifier as the next segment.
const ID_PATH_PREFIXES: &[&str] = &["live", "shorts", "embed", "v"];

/// Resolves the video identifier from a page location.
///
/// Handles `/watch?v=<id>`, `/live/<id>`, `/shorts/<id>`, `/embed/<id>` and
/// `youtu.be/<id>`.
pub fn resolve_video_id(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;

    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return valid_id(&id);
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let host = url.host_str().unwrap_or_default();
    if host == "youtu.be" || host.ends_with(".youtu.be") {
        return segments.next().and_then(valid_id);
    }

    let first = segments.next()?;
    if ID_PATH_PREFIXES.contains(&first) {
        return segments.next().and_then(valid_id);
    }
    None
}

fn valid_id(candidate: &str) -> Option<String> {
    let ok = !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    ok.then(|| candidate.to_string())
}

/// What the summarizer needs to know about the current video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub video_id: Option<String>,
    pub title: String,
}

impl VideoDetails {
    pub fn from_page(page: &dyn PageInspector) -> Self {
        let video_id = resolve_video_id(page.location());
        let title = page
            .title()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| match &video_id {
                Some(id) => format!("YouTube Video {id}"),
                None => "Unknown Title".to_string(),
            });
        Self { video_id, title }
    }
}
