use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::host::Voice;

/// Voices known to the host. Hosts often populate their list late, so the
/// list is published whenever it changes and readers can wait for it.
#[derive(Clone)]
pub struct VoiceCatalog {
    tx: Arc<watch::Sender<Vec<Voice>>>,
}

impl VoiceCatalog {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx: Arc::new(tx) }
    }

    /// Replaces the known voices and wakes any waiting `list_voices` calls.
    pub fn publish(&self, voices: Vec<Voice>) {
        debug!(count = voices.len(), "Voice list updated");
        self.tx.send_replace(voices);
    }

    /// Voices known right now, possibly empty.
    pub fn snapshot(&self) -> Vec<Voice> {
        self.tx.borrow().clone()
    }

    /// Resolves with the voice list, waiting until the host has published a
    /// non-empty one.
    pub async fn list_voices(&self) -> Vec<Voice> {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|voices| !voices.is_empty()).await {
            Ok(voices) => voices.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Looks up a voice by name.
    pub fn find(&self, name: &str) -> Option<Voice> {
        self.tx.borrow().iter().find(|v| v.name == name).cloned()
    }
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
