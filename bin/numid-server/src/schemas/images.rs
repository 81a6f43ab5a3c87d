use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/images/svg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SvgRequest {
    /// What to draw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
