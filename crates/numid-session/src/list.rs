use numid_types::{Message, Role, Session};
use rand::Rng;

pub const NEW_CHAT_TITLE: &str = "New chat";
pub const GREETING: &str = "Hi! Ask me anything.";
/// A fresh session is titled after this many characters of its first user message.
pub const TITLE_MAX_CHARS: usize = 40;

const ID_LEN: usize = 8;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Eight random lowercase alphanumerics.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN).map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char).collect()
}

/// The in-memory session list of a client, newest first, with one active session.
#[derive(Debug, Clone, Default)]
pub struct SessionList {
    sessions: Vec<Session>,
    active: Option<String>,
}

impl SessionList {
    /// Open a loaded list. An empty list gets one fresh session so there is
    /// always something to chat in.
    pub fn open(sessions: Vec<Session>) -> Self {
        let mut list = Self { active: sessions.first().map(|s| s.id.clone()), sessions };
        if list.sessions.is_empty() {
            list.new_session();
        }
        list
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The selected session, falling back to the first one when the selected
    /// id no longer exists.
    pub fn active(&self) -> Option<&Session> {
        self.active.as_deref().and_then(|id| self.get(id)).or_else(|| self.sessions.first())
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active().map(|s| s.id.as_str())
    }

    /// Create a session at the front of the list and make it active.
    pub fn new_session(&mut self) -> &Session {
        let session = Session {
            id: generate_id(),
            title: NEW_CHAT_TITLE.to_owned(),
            messages: vec![Message::assistant(GREETING)],
        };
        self.active = Some(session.id.clone());
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Returns false when no session has that id.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id.to_owned());
        true
    }

    /// Remove a session. Deleting the active one activates the first
    /// remaining session.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sessions.remove(pos);
        if self.active.as_deref() == Some(id) {
            self.active = self.sessions.first().map(|s| s.id.clone());
        }
        true
    }

    /// Append to the active session, creating one when the list is empty,
    /// and derive its title from the first user message.
    pub fn push(&mut self, message: Message) {
        let session = self.active_mut();
        session.messages.push(message);
        derive_title(session);
    }

    /// Set the text of the assistant reply that ends the active session,
    /// appending a new assistant message when the last one is not from the
    /// assistant.
    pub fn set_reply(&mut self, text: impl Into<String>) {
        let session = self.active_mut();
        match session.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => last.content = text.into(),
            _ => session.messages.push(Message::assistant(text)),
        }
    }

    fn active_mut(&mut self) -> &mut Session {
        let pos = match self.active.as_deref().and_then(|id| self.sessions.iter().position(|s| s.id == id)) {
            Some(pos) => pos,
            None if self.sessions.is_empty() => {
                self.new_session();
                0
            }
            None => 0,
        };
        &mut self.sessions[pos]
    }
}

/// Title a session still called [`NEW_CHAT_TITLE`] after its first non-blank
/// user message.
fn derive_title(session: &mut Session) {
    if session.title != NEW_CHAT_TITLE {
        return;
    }
    let Some(first) = session.messages.iter().find(|m| m.role == Role::User) else {
        return;
    };
    let title: String = first.content.chars().take(TITLE_MAX_CHARS).collect();
    if !title.trim().is_empty() {
        session.title = title;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn session(id: &str) -> Session {
        Session { id: id.into(), title: NEW_CHAT_TITLE.into(), messages: vec![] }
    }

    #[test]
    fn ids_are_short_lowercase_alphanumerics() {
        for _ in 0..50 {
            let id = generate_id();
            assert_eq!(id.len(), 8);
            assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()), "{id}");
        }
    }

    #[test]
    fn opening_empty_list_creates_greeting_session() {
        let list = SessionList::open(vec![]);
        assert_eq!(list.sessions().len(), 1);
        let active = list.active().unwrap();
        assert_eq!(active.title, NEW_CHAT_TITLE);
        assert_eq!(active.messages, vec![Message::assistant(GREETING)]);
    }

    #[test]
    fn opening_loaded_list_activates_first() {
        let list = SessionList::open(vec![session("aaaa1111"), session("bbbb2222")]);
        assert_eq!(list.active_id(), Some("aaaa1111"));
    }

    #[test]
    fn new_session_goes_first_and_becomes_active() {
        let mut list = SessionList::open(vec![session("aaaa1111")]);
        let id = list.new_session().id.clone();
        assert_eq!(list.sessions()[0].id, id);
        assert_eq!(list.active_id(), Some(id.as_str()));
    }

    #[test]
    fn title_comes_from_first_user_message() {
        let mut list = SessionList::open(vec![]);
        let long = "Explain the borrow checker to me like I am five years old please";
        list.push(Message::user(long));
        list.push(Message::user("second question"));

        let title = &list.active().unwrap().title;
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
        assert!(long.starts_with(title.as_str()));
    }

    #[test]
    fn title_is_kept_once_renamed() {
        let mut s = session("aaaa1111");
        s.title = "Custom".into();
        let mut list = SessionList::open(vec![s]);
        list.push(Message::user("hello"));
        assert_eq!(list.active().unwrap().title, "Custom");
    }

    #[test]
    fn blank_first_message_keeps_default_title() {
        let mut list = SessionList::open(vec![]);
        list.push(Message::user(""));
        assert_eq!(list.active().unwrap().title, NEW_CHAT_TITLE);
    }

    #[test]
    fn title_truncation_respects_char_boundaries() {
        let mut list = SessionList::open(vec![]);
        list.push(Message::user("é".repeat(60)));
        assert_eq!(list.active().unwrap().title, "é".repeat(TITLE_MAX_CHARS));
    }

    #[test]
    fn reply_replaces_trailing_assistant_message() {
        let mut list = SessionList::open(vec![]);
        list.push(Message::user("hi"));
        list.set_reply("Hel");
        list.set_reply("Hello");

        let messages = &list.active().unwrap().messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], Message::assistant("Hello"));
    }

    #[test]
    fn deleting_active_activates_first_remaining() {
        let mut list = SessionList::open(vec![session("aaaa1111"), session("bbbb2222"), session("cccc3333")]);
        assert!(list.select("bbbb2222"));
        assert!(list.delete("bbbb2222"));
        assert_eq!(list.active_id(), Some("aaaa1111"));

        assert!(list.delete("aaaa1111"));
        assert_eq!(list.active_id(), Some("cccc3333"));
        assert!(!list.delete("missing"));
    }

    #[test]
    fn deleting_inactive_keeps_selection() {
        let mut list = SessionList::open(vec![session("aaaa1111"), session("bbbb2222")]);
        assert!(list.select("bbbb2222"));
        list.delete("aaaa1111");
        assert_eq!(list.active_id(), Some("bbbb2222"));
    }

    #[test]
    fn push_after_deleting_everything_starts_a_new_session() {
        let mut list = SessionList::open(vec![session("aaaa1111")]);
        list.delete("aaaa1111");
        assert!(list.active().is_none());

        list.push(Message::user("again"));
        let active = list.active().unwrap();
        assert_eq!(active.title, "again");
        assert_eq!(active.messages.len(), 2);
    }

    #[test]
    fn select_unknown_is_refused() {
        let mut list = SessionList::open(vec![session("aaaa1111")]);
        assert!(!list.select("zzzz9999"));
        assert_eq!(list.active_id(), Some("aaaa1111"));
    }
}
