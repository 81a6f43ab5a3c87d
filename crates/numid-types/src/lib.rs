//! Shared chat data model.
//!
//! These types travel unchanged between the terminal client, the HTTP server
//! and the on-disk session blob, so their JSON shape is fixed: camelCase
//! attachment fields and lowercase role names.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Speaker of a single turn, in application vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Function,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Function => "function",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary data embedded in a message as a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// `data:<mime>;base64,<payload>`, or a bare base64 payload.
    #[serde(default)]
    pub data_uri: String,
    /// MIME type of the payload; `None` lets the decoder infer it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), attachment: None }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// A titled, ordered conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn message_uses_camel_case_attachment_fields() {
        let msg = Message::user("look").with_attachment(Attachment {
            data_uri: "data:image/png;base64,AAAA".into(),
            mime_type: Some("image/png".into()),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["attachment"]["dataUri"], "data:image/png;base64,AAAA");
        assert_eq!(json["attachment"]["mimeType"], "image/png");
    }

    #[test]
    fn message_without_attachment_omits_the_field() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        let msg: Message = serde_json::from_str(r#"{"role":"user"}"#).unwrap();
        assert_eq!(msg.content, "");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let res: Result<Message, _> = serde_json::from_str(r#"{"role":"robot","content":"x"}"#);
        assert!(res.is_err());
    }
}
