use numid_types::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Request body for `POST /api/chat` and `POST /api/chat/stream`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Conversation so far; the last entry must be a user message.
    ///
    /// Kept as raw JSON so a missing or non-array value can be reported
    /// with a precise message instead of a generic decode error.
    #[serde(default)]
    #[schema(value_type = Vec<Message>)]
    pub messages: Value,
    /// Upstream model; the server default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub reply: String,
}

/// Error body shared by every route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
