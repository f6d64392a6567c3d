pub mod engine;
pub mod error;
pub mod fetch;
pub mod memory;
pub mod page;
pub mod pipeline;
pub mod strategy;
pub mod tracks;
pub mod video;

pub use engine::TranscriptPipeline;
pub use error::{AcquisitionError, ErrorKind};
pub use fetch::{CaptionFetcher, HttpCaptionFetcher};
pub use memory::StrategyMemory;
pub use page::{PageInspector, StaticPage, TranscriptPanel};
pub use strategy::{ExtractionStrategy, StrategyContext};
pub use tracks::CaptionTrack;
pub use video::{VideoDetails, resolve_video_id};

use serde::{Deserialize, Serialize};

/// One cue-or-merged-cues unit of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Offset of the first merged cue from the start of the video.
    pub start_offset_ms: i64,
    pub text: String,
}

/// Transcript produced by a strategy.
///
/// Caption-track strategies keep timing and produce segments; the transcript
/// panel strategy only sees rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transcript {
    Plain(String),
    Segments(Vec<TranscriptSegment>),
}

impl Transcript {
    /// Flattens the transcript to a single space-separated string.
    pub fn plain_text(&self) -> String {
        match self {
            Transcript::Plain(text) => text.clone(),
            Transcript::Segments(segments) => segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn segments(&self) -> Option<&[TranscriptSegment]> {
        match self {
            Transcript::Plain(_) => None,
            Transcript::Segments(segments) => Some(segments),
        }
    }
}

/// Identifies one extraction technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// In-memory player configuration object.
    PlayerData,
    /// Serialized caption-track lists inside inline scripts.
    ScriptTags,
    /// Global-variable assignments in the raw page markup.
    PageMarkup,
    /// The page's own transcript panel.
    TranscriptPanel,
}

impl StrategyId {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::PlayerData => "player_data",
            StrategyId::ScriptTags => "script_tags",
            StrategyId::PageMarkup => "page_markup",
            StrategyId::TranscriptPanel => "transcript_panel",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `extract_transcript` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractionResult {
    Success {
        transcript: Transcript,
        #[serde(rename = "strategyUsed")]
        strategy_used: StrategyId,
    },
    Failure {
        error: ErrorKind,
    },
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            ExtractionResult::Success { transcript, .. } => Some(transcript),
            ExtractionResult::Failure { .. } => None,
        }
    }

    pub fn strategy_used(&self) -> Option<StrategyId> {
        match self {
            ExtractionResult::Success { strategy_used, .. } => Some(*strategy_used),
            ExtractionResult::Failure { .. } => None,
        }
    }
}
