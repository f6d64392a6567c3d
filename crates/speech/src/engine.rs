use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tubesum_config::SpeechSettings;

use crate::boundary::{word_count, word_index_at};
use crate::error::SpeechError;
use crate::host::{BoundaryKind, SpeechEvent, SpeechHost, Utterance, Voice};
use crate::voices::VoiceCatalog;

pub const DEFAULT_VOICE: &str = "default";
pub const MIN_RATE: f32 = 0.1;
pub const MAX_RATE: f32 = 10.0;
pub const MIN_PITCH: f32 = 0.0;
pub const MAX_PITCH: f32 = 2.0;

type IndexCallback = Box<dyn FnMut(usize) + Send>;
type Callback = Box<dyn FnMut() + Send>;

/// Generation tag of one playback session. Events carrying an older tag
/// belong to a stopped or replaced session and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport state of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
    Paused,
}

/// Per-call overrides for [`SpeechEngine::speak`]. Unset fields use the
/// engine's current preferences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakOptions {
    pub voice: Option<String>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

struct Session {
    id: SessionId,
    text: String,
    word_count: usize,
    rate: f32,
    pitch: f32,
    voice: Option<Voice>,
}

/// Drives one speech session at a time and turns host progress events into
/// word-index callbacks.
///
/// The caller renders one anchor per word of the spoken text (see
/// [`crate::readable::words`]) and reacts to the indices this engine reports.
/// Host events are fed back through [`SpeechEngine::handle_event`].
pub struct SpeechEngine<H: SpeechHost> {
    host: H,
    catalog: VoiceCatalog,
    /// Used by the next `speak`; never applied to a running session.
    preferences: SpeechSettings,
    state: PlaybackState,
    generation: u64,
    session: Option<Session>,
    current_word: Option<usize>,
    on_word_boundary: Option<IndexCallback>,
    on_scroll_request: Option<IndexCallback>,
    on_end: Option<Callback>,
    on_highlight_cleared: Option<Callback>,
}

impl<H: SpeechHost> SpeechEngine<H> {
    pub fn new(host: H, catalog: VoiceCatalog, preferences: SpeechSettings) -> Self {
        Self {
            host,
            catalog,
            preferences,
            state: PlaybackState::Idle,
            generation: 0,
            session: None,
            current_word: None,
            on_word_boundary: None,
            on_scroll_request: None,
            on_end: None,
            on_highlight_cleared: None,
        }
    }

    /// Called with the word index each time playback enters a new word.
    pub fn on_word_boundary(&mut self, callback: impl FnMut(usize) + Send + 'static) {
        self.on_word_boundary = Some(Box::new(callback));
    }

    /// Called alongside the word-boundary callback so the caller can keep the
    /// active word visible.
    pub fn on_scroll_request(&mut self, callback: impl FnMut(usize) + Send + 'static) {
        self.on_scroll_request = Some(Box::new(callback));
    }

    /// Called once per session when it finishes on its own or fails. Not
    /// called on `stop`.
    pub fn on_end(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_end = Some(Box::new(callback));
    }

    /// Called when the highlight should be removed (stop and natural end).
    pub fn on_highlight_cleared(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_highlight_cleared = Some(Box::new(callback));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the highlighted word; `None` when nothing is highlighted.
    pub fn current_word_index(&self) -> Option<usize> {
        self.current_word
    }

    /// Session currently playing or paused.
    pub fn session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Word count of the active session's text.
    pub fn word_count(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.word_count)
    }

    pub fn preferences(&self) -> &SpeechSettings {
        &self.preferences
    }

    pub fn voices(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.preferences.rate = clamp_rate(rate);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.preferences.pitch = clamp_pitch(pitch);
    }

    pub fn set_voice(&mut self, voice: impl Into<String>) {
        self.preferences.voice = voice.into();
    }

    /// Starts speaking `text`, stopping any session that is still active.
    pub fn speak(&mut self, text: impl Into<String>, options: SpeakOptions) -> SessionId {
        if self.state != PlaybackState::Idle {
            debug!(state = ?self.state, "Stopping active session before new one");
            self.stop();
        }

        self.generation += 1;
        let id = SessionId(self.generation);
        let text = text.into();

        let rate = clamp_rate(options.rate.unwrap_or(self.preferences.rate));
        let pitch = clamp_pitch(options.pitch.unwrap_or(self.preferences.pitch));
        let voice_name = options.voice.unwrap_or_else(|| self.preferences.voice.clone());
        let voice = self.resolve_voice(&voice_name);

        let session = Session {
            id,
            word_count: word_count(&text),
            text,
            rate,
            pitch,
            voice,
        };
        info!(
            session = %id,
            words = session.word_count,
            rate = session.rate,
            pitch = session.pitch,
            voice = session.voice.as_ref().map(|v| v.name.as_str()).unwrap_or(DEFAULT_VOICE),
            "Starting speech session"
        );

        let utterance = Utterance {
            session: id,
            text: session.text.clone(),
            rate: session.rate,
            pitch: session.pitch,
            voice: session.voice.clone(),
        };

        self.current_word = None;
        self.session = Some(session);
        self.state = PlaybackState::Speaking;

        if let Err(e) = self.host.speak(&utterance) {
            self.fail(e);
        }
        id
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Speaking {
            self.host.pause();
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.host.resume();
            self.state = PlaybackState::Speaking;
        }
    }

    /// Cancels playback and clears the highlight. Always leaves the engine idle
    /// with no highlighted word; `on_end` is not called.
    pub fn stop(&mut self) {
        let had_session = self.session.take().is_some();
        let had_highlight = self.current_word.take().is_some();

        if had_session {
            // Invalidate events still in flight for the cancelled utterance.
            self.generation += 1;
            self.host.cancel();
            debug!("Speech session stopped");
        }
        self.state = PlaybackState::Idle;

        if had_session || had_highlight {
            if let Some(cb) = self.on_highlight_cleared.as_mut() {
                cb();
            }
        }
    }

    /// Applies a host event for `session`. Events for any other session are
    /// ignored.
    pub fn handle_event(&mut self, session: SessionId, event: SpeechEvent) {
        let Some(active) = self.session.as_ref() else {
            debug!(session = %session, ?event, "Ignoring event, no active session");
            return;
        };
        if active.id != session {
            debug!(session = %session, active = %active.id, ?event, "Ignoring stale event");
            return;
        }

        match event {
            // `speak` already moved to Speaking; a late Start must not undo a pause.
            SpeechEvent::Start => {
                debug!(session = %session, state = ?self.state, "Host started utterance");
            }
            SpeechEvent::Boundary { char_index, kind } => {
                if kind != BoundaryKind::Word {
                    return;
                }
                let Some(index) = word_index_at(&active.text, char_index) else {
                    return;
                };
                if self.current_word == Some(index) {
                    return;
                }
                self.current_word = Some(index);
                if let Some(cb) = self.on_word_boundary.as_mut() {
                    cb(index);
                }
                if let Some(cb) = self.on_scroll_request.as_mut() {
                    cb(index);
                }
            }
            SpeechEvent::Pause => {
                self.state = PlaybackState::Paused;
            }
            SpeechEvent::Resume => {
                self.state = PlaybackState::Speaking;
            }
            SpeechEvent::End => {
                info!(session = %session, "Speech session finished");
                self.session = None;
                self.current_word = None;
                self.state = PlaybackState::Idle;
                if let Some(cb) = self.on_highlight_cleared.as_mut() {
                    cb();
                }
                if let Some(cb) = self.on_end.as_mut() {
                    cb();
                }
            }
            SpeechEvent::Error(message) => {
                self.fail(SpeechError::Synthesis(message));
            }
        }
    }

    /// Ends the session like a natural end, but keeps the highlighted word so
    /// the caller can show where playback stopped.
    fn fail(&mut self, error: SpeechError) {
        warn!(error = %error, word = ?self.current_word, "Speech session failed");
        self.session = None;
        self.state = PlaybackState::Idle;
        if let Some(cb) = self.on_end.as_mut() {
            cb();
        }
    }

    fn resolve_voice(&self, name: &str) -> Option<Voice> {
        if name.is_empty() || name == DEFAULT_VOICE {
            return None;
        }
        let voice = self.catalog.find(name);
        if voice.is_none() {
            let error = SpeechError::VoiceUnavailable(name.to_string());
            warn!(error = %error, "Using the host default voice");
        }
        voice
    }
}

/// Host-supported rate range; faster requests are capped.
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(MIN_RATE, MAX_RATE)
    } else {
        1.0
    }
}

pub fn clamp_pitch(pitch: f32) -> f32 {
    if pitch.is_finite() {
        pitch.clamp(MIN_PITCH, MAX_PITCH)
    } else {
        1.0
    }
}
