//! Speech playback synchronized with on-screen word highlighting.
//!
//! [`SpeechEngine`] owns a single playback session against a [`SpeechHost`]
//! and reports which word is being spoken. [`readable`] turns summary markdown
//! into the text that is spoken and the words the caller renders.

pub mod boundary;
pub mod engine;
pub mod error;
pub mod host;
pub mod readable;
pub mod voices;

pub use boundary::{word_count, word_index_at};
pub use engine::{PlaybackState, SessionId, SpeakOptions, SpeechEngine};
pub use error::SpeechError;
pub use host::{BoundaryKind, SpeechEvent, SpeechHost, Utterance, Voice};
pub use readable::{readable_text, words};
pub use voices::VoiceCatalog;
