//! Conversation sanitation.
//!
//! The upstream chat API insists on a history that opens with a user turn and
//! a pending turn that also comes from the user. Client-side greetings
//! ("Hi! Ask me anything.") routinely violate the first rule, so leading
//! non-user turns are dropped; the second rule is reported as an error.

use numid_types::Message;

use crate::attachment;
use crate::error::SanitizeError;
use crate::gemini::types::{Content, Part};
use crate::role;

/// A message list split into upstream history and the pending user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Every turn before the last, in upstream role vocabulary.
    pub history: Vec<Content>,
    /// Parts of the pending user turn.
    pub turn: Vec<Part>,
}

/// Build a [`Conversation`] from raw client messages.
pub fn sanitize(messages: &[Message]) -> Result<Conversation, SanitizeError> {
    let start = messages
        .iter()
        .position(|m| role::is_user(m.role))
        .ok_or(SanitizeError::NoUserMessages)?;
    let kept = &messages[start..];

    let (last, earlier) = kept.split_last().ok_or(SanitizeError::NoUserMessages)?;
    if !role::is_user(last.role) {
        return Err(SanitizeError::TrailingNonUser);
    }

    let history = earlier
        .iter()
        .map(|m| Content::new(role::to_upstream(m.role), parts(m)))
        .collect();

    Ok(Conversation { history, turn: parts(last) })
}

/// Text (when non-empty) followed by the inline attachment (when present).
fn parts(message: &Message) -> Vec<Part> {
    let mut parts = Vec::with_capacity(2);
    if !message.content.is_empty() {
        parts.push(Part::text(message.content.as_str()));
    }
    if let Some(inline) = attachment::decode(message.attachment.as_ref()) {
        parts.push(inline.into());
    }
    parts
}
