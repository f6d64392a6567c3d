use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g. `TUBESUM__SPEECH__RATE=1.5`.
pub const ENV_PREFIX: &str = "TUBESUM";

/// Top-level settings for every subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub acquisition: AcquisitionSettings,
    pub speech: SpeechSettings,
    pub summary: SummarySettings,
}

impl Settings {
    /// Loads settings: compiled defaults, then the optional file, then the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Configuration for transcript acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// Caption language picked first when several tracks exist.
    pub preferred_language: String,
    /// Timeout for a single caption-track fetch. Expiry counts as strategy failure.
    pub fetch_timeout_secs: u64,
    /// How long the transcript panel is given to render after being opened.
    pub ui_settle_delay_ms: u64,
    /// Caption bodies larger than this are rejected unparsed.
    pub max_caption_bytes: usize,
    pub merge: MergeLimits,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            preferred_language: "en".to_string(),
            fetch_timeout_secs: 10,
            ui_settle_delay_ms: 1500,
            max_caption_bytes: 5 * 1024 * 1024,
            merge: MergeLimits::default(),
        }
    }
}

/// Thresholds at which consecutive cues stop being merged into one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeLimits {
    pub max_chars: usize,
    pub max_words: usize,
    /// Cues ending in a period count as one sentence each.
    pub max_sentences: usize,
}

impl Default for MergeLimits {
    fn default() -> Self {
        Self {
            max_chars: 500,
            max_words: 100,
            max_sentences: 3,
        }
    }
}

/// Speech preferences applied to the next utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Voice name, or "default" for the host's default voice.
    pub voice: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            voice: "default".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    Brief,
    Detailed,
    #[default]
    Bullet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Connection settings for the external summarization service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    pub base_url: String,
    pub summary_type: SummaryType,
    pub summary_length: SummaryLength,
    pub timeout_secs: u64,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            base_url: "https://tubesumtalk.onrender.com".to_string(),
            summary_type: SummaryType::default(),
            summary_length: SummaryLength::default(),
            timeout_secs: 60,
        }
    }
}
