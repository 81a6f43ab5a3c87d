use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/vision/describe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRequest {
    /// `data:<mime>;base64,<payload>` or bare base64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Instruction sent with the image; "Describe this image in detail." when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Response body for `POST /api/vision/describe`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DescribeResponse {
    pub text: String,
}
