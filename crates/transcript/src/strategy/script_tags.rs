use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{TrackSource, json_value_at, non_empty};
use crate::StrategyId;
use crate::error::AcquisitionError;
use crate::page::PageInspector;
use crate::tracks::{CaptionTrack, tracks_from_array};

/// How a caption-track list is serialized inside a script body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Serialization {
    /// `"captionTracks":[...]`
    Json,
    /// `\"captionTracks\":[...]`, JSON embedded in a string literal.
    EscapedJson,
    /// `captionTracks:[...]` or `'captionTracks':[...]`
    ObjectLiteral,
}

static PATTERNS: LazyLock<Vec<(Serialization, Regex)>> = LazyLock::new(|| {
    vec![
        (Serialization::Json, r#""captionTracks"\s*:\s*\["#),
        (Serialization::EscapedJson, r#"\\"captionTracks\\"\s*:\s*\["#),
        (Serialization::ObjectLiteral, r#"(?:^|[\s{,])'?captionTracks'?\s*:\s*\["#),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Pattern scan of inline script bodies for a serialized caption-track list.
pub struct ScriptTagSource;

impl TrackSource for ScriptTagSource {
    fn id(&self) -> StrategyId {
        StrategyId::ScriptTags
    }

    fn requires_video_id(&self) -> bool {
        true
    }

    fn locate_tracks(&self, page: &dyn PageInspector) -> Result<Vec<CaptionTrack>, AcquisitionError> {
        for script in page.inline_scripts() {
            if !script.contains("captionTracks") {
                continue;
            }
            for (kind, pattern) in PATTERNS.iter() {
                for found in pattern.find_iter(&script) {
                    // Every pattern ends on the opening bracket.
                    let array_start = found.end() - 1;
                    let tracks = parse_track_array(&script[array_start..], *kind);
                    if !tracks.is_empty() {
                        debug!(serialization = ?kind, "Caption tracks found in script tag");
                        return Ok(tracks);
                    }
                }
            }
        }
        non_empty(Vec::new(), "inline scripts")
    }
}

fn parse_track_array(text: &str, kind: Serialization) -> Vec<CaptionTrack> {
    let value = match kind {
        Serialization::Json | Serialization::ObjectLiteral => json_value_at(text),
        Serialization::EscapedJson => json_value_at(&unescape_js_string(text)),
    };
    value.map(|v| tracks_from_array(&v)).unwrap_or_default()
}

/// Removes one level of JavaScript string escaping.
fn unescape_js_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
