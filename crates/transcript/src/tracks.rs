use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One available caption stream for the current video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub language_code: String,
    pub display_name: String,
    pub url: String,
}

impl CaptionTrack {
    /// Reads a track from the player's serialized form. Entries without a
    /// `baseUrl` are unusable and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let url = value.get("baseUrl")?.as_str()?.to_string();
        if url.is_empty() {
            return None;
        }
        let language_code = value
            .get("languageCode")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let display_name = value
            .get("name")
            .map(display_name_of)
            .unwrap_or_default();
        Some(Self {
            language_code,
            display_name,
            url,
        })
    }
}

/// `name` is either `{simpleText}` or `{runs: [{text}, ...]}`.
fn display_name_of(name: &Value) -> String {
    if let Some(text) = name.get("simpleText").and_then(Value::as_str) {
        return text.to_string();
    }
    name.get("runs")
        .and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|r| r.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Parses a `captionTracks` array, dropping unusable entries.
pub fn tracks_from_array(value: &Value) -> Vec<CaptionTrack> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(CaptionTrack::from_json).collect())
        .unwrap_or_default()
}

/// Finds the caption-track list inside a player response object.
///
/// Older page versions nest the response as a JSON string under
/// `args.player_response`.
pub fn tracks_from_player_response(value: &Value) -> Vec<CaptionTrack> {
    if let Some(tracks) = value.pointer("/captions/playerCaptionsTracklistRenderer/captionTracks") {
        return tracks_from_array(tracks);
    }
    if let Some(nested) = value
        .pointer("/args/player_response")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
    {
        return tracks_from_player_response(&nested);
    }
    Vec::new()
}

/// Picks the preferred language, then any track named "English", then the first.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred_language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == preferred_language)
        .or_else(|| tracks.iter().find(|t| t.display_name == "English"))
        .or_else(|| tracks.first())
}
