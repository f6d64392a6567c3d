use serde::{Deserialize, Serialize};

use crate::engine::SessionId;
use crate::error::SpeechError;

/// A synthesis voice offered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
    /// Whether the host uses this voice when none is chosen.
    #[serde(default)]
    pub is_default: bool,
}

/// One request to the host speech subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Session the host must tag every event for this utterance with.
    pub session: SessionId,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    /// `None` lets the host pick its default voice.
    pub voice: Option<Voice>,
}

/// Kind of a boundary event. Only word boundaries move the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// Progress events delivered by the host for an utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Start,
    /// The host reached `char_index` (in chars) of the utterance text.
    Boundary { char_index: usize, kind: BoundaryKind },
    Pause,
    Resume,
    End,
    Error(String),
}

/// The platform speech synthesizer.
///
/// Calls are synchronous; progress comes back later through
/// [`crate::SpeechEngine::handle_event`] tagged with the utterance's session.
pub trait SpeechHost {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Drops the current utterance without an `End` event.
    fn cancel(&mut self);
}
