//! Plain text for speech, derived from summary markdown.

use std::sync::LazyLock;

use regex::Regex;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[*+-]|\d+[.)])\s+").expect("valid regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
static STRONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*|__(.+?)__").expect("valid regex"));
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").expect("valid regex"));

const BULLET: &str = "• ";

/// Converts markdown into the text that is handed to the speech host.
///
/// Headings, emphasis, inline code and link syntax are removed (link text is
/// kept), list items are prefixed with `• ` and all whitespace is collapsed to
/// single spaces.
pub fn readable_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for line in markdown.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (prefix, body) = if let Some(m) = LIST_ITEM.find(line) {
            (BULLET, &line[m.end()..])
        } else if let Some(m) = HEADING.find(line) {
            ("", &line[m.end()..])
        } else {
            ("", line)
        };

        let body = LINK.replace_all(body, "$1");
        let body = STRONG.replace_all(&body, "$1$2");
        let body = EMPHASIS.replace_all(&body, "$1");
        let body = CODE.replace_all(&body, "$1");

        out.push_str(prefix);
        out.push_str(&body);
        out.push(' ');
    }

    words(&out).join(" ")
}

/// The words of `text` in order. Callers render one anchor per entry so anchor
/// indices line up with [`crate::boundary::word_index_at`].
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
