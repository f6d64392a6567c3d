use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{TrackSource, json_value_at, non_empty};
use crate::StrategyId;
use crate::error::AcquisitionError;
use crate::page::PageInspector;
use crate::tracks::{CaptionTrack, tracks_from_player_response};

/// Global variables known to carry the player configuration.
const CONTAINERS: &[&str] = &[
    r#"window["ytInitialPlayerResponse"]"#,
    "ytInitialPlayerResponse",
    "ytPlayerConfig",
];

static ASSIGNMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CONTAINERS
        .iter()
        .map(|name| Regex::new(&format!(r"{}\s*=\s*\{{", regex::escape(name))).expect("valid regex"))
        .collect()
});

/// Regex scan of the raw page markup for a global assignment with embedded JSON.
pub struct PageMarkupSource;

impl TrackSource for PageMarkupSource {
    fn id(&self) -> StrategyId {
        StrategyId::PageMarkup
    }

    fn locate_tracks(&self, page: &dyn PageInspector) -> Result<Vec<CaptionTrack>, AcquisitionError> {
        let markup = page.markup();
        for (name, assignment) in CONTAINERS.iter().zip(ASSIGNMENTS.iter()) {
            for found in assignment.find_iter(&markup) {
                // The pattern ends on the opening brace of the object.
                let object_start = found.end() - 1;
                let Some(value) = json_value_at(&markup[object_start..]) else {
                    debug!(container = %name, "Assignment found but JSON did not parse");
                    continue;
                };
                let tracks = tracks_from_player_response(&value);
                if !tracks.is_empty() {
                    debug!(container = %name, "Caption tracks found in page markup");
                    return Ok(tracks);
                }
            }
        }
        non_empty(Vec::new(), "page markup")
    }
}
