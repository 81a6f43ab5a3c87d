use numid_types::Session;
use tracing::{debug, warn};

use crate::storage::KeyValueStorage;

/// Storage key of the serialized session list.
pub const SESSIONS_KEY: &str = "gemini_chat_sessions_v1";

/// Loads and saves the full session list as one JSON array.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage, key: SESSIONS_KEY.to_owned() }
    }

    /// Every stored session, in stored order.
    ///
    /// A missing entry, an unreadable entry, invalid JSON and a JSON value
    /// that is not a session array all read as an empty list.
    pub fn load(&self) -> Vec<Session> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read sessions; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Session>>(&raw) {
            Ok(sessions) => {
                debug!(count = sessions.len(), "sessions loaded");
                sessions
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored sessions are not a valid session list; ignoring");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list with `sessions`. Failures are logged only.
    pub fn save(&self, sessions: &[Session]) {
        let raw = match serde_json::to_string(sessions) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize sessions");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&self.key, &raw) {
            warn!(key = %self.key, error = %e, "failed to save sessions");
        }
    }
}
