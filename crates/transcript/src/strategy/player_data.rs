use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{TrackSource, json_value_at, non_empty};
use crate::StrategyId;
use crate::error::AcquisitionError;
use crate::page::PageInspector;
use crate::tracks::{CaptionTrack, tracks_from_player_response};

static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ytInitialPlayerResponse\s*=\s*").expect("valid regex"));

/// Structured lookup in the player configuration object.
///
/// Reads the in-memory object when the page exposes one, otherwise the
/// `ytInitialPlayerResponse = {...}` assignment in an inline script.
pub struct PlayerDataSource;

impl TrackSource for PlayerDataSource {
    fn id(&self) -> StrategyId {
        StrategyId::PlayerData
    }

    fn requires_video_id(&self) -> bool {
        true
    }

    fn locate_tracks(&self, page: &dyn PageInspector) -> Result<Vec<CaptionTrack>, AcquisitionError> {
        if let Some(response) = page.player_response() {
            let tracks = tracks_from_player_response(&response);
            if !tracks.is_empty() {
                return Ok(tracks);
            }
            debug!("In-memory player response has no caption tracks");
        }

        for script in page.inline_scripts() {
            for found in ASSIGNMENT_RE.find_iter(&script) {
                let Some(response) = json_value_at(&script[found.end()..]) else {
                    debug!("Player response assignment is not valid JSON");
                    continue;
                };
                let tracks = tracks_from_player_response(&response);
                if !tracks.is_empty() {
                    return Ok(tracks);
                }
            }
        }

        non_empty(Vec::new(), "player response")
    }
}
