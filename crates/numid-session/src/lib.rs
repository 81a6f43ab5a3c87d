//! Client-side session persistence.
//!
//! The whole session list lives in a single key-value entry and is rewritten
//! on every save. Reads never fail (a bad entry reads as "no sessions") and
//! writes never fail (errors are logged and dropped): losing history is
//! preferable to a client that refuses to start.

mod list;
mod storage;
mod store;

pub use list::{generate_id, SessionList, GREETING, NEW_CHAT_TITLE, TITLE_MAX_CHARS};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{SessionStore, SESSIONS_KEY};
