use thiserror::Error;

/// Failures inside a playback session. They are logged and resolved to a
/// terminal state by the engine, never returned from transport calls.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpeechError {
    #[error("voice not available: {0}")]
    VoiceUnavailable(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}
