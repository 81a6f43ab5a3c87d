//! Image description (`POST /api/vision/describe`).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use numid_core::gemini::types::Part;
use numid_core::{attachment, GenerateRequest, DEFAULT_VISION_PROMPT};
use tracing::info;
use utoipa::OpenApi;

use super::{json_body, non_empty};
use crate::error::ServerError;
use crate::schemas::chat::ErrorBody;
use crate::schemas::vision::{DescribeRequest, DescribeResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(describe), components(schemas(DescribeRequest, DescribeResponse)))]
pub struct VisionApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/vision/describe", post(describe))
}

/// Describe an inline image.
#[utoipa::path(
    post,
    path = "/api/vision/describe",
    tag = "vision",
    request_body = DescribeRequest,
    responses(
        (status = 200, description = "Model description of the image", body = DescribeResponse),
        (status = 400, description = "No image data", body = ErrorBody),
        (status = 500, description = "Upstream error", body = ErrorBody),
    )
)]
pub async fn describe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DescribeRequest>, JsonRejection>,
) -> Result<Json<DescribeResponse>, ServerError> {
    let req = json_body(payload)?;
    let image = non_empty(req.data_uri)
        .and_then(|uri| attachment::inline_data(&uri, req.mime_type.as_deref()))
        .ok_or_else(|| ServerError::BadRequest("missing image data".into()))?;
    let prompt = non_empty(req.prompt).unwrap_or_else(|| DEFAULT_VISION_PROMPT.to_owned());
    let model = state.model_or_default(req.model);

    info!(%model, mime_type = %image.mime_type, payload_len = image.data.len(), "describing image");

    let request = GenerateRequest::single(model, vec![Part::text(prompt), image.into()])
        .with_system_instruction(state.config.system_prompt.clone());
    let text = state.dispatcher.generate(request).await?;

    Ok(Json(DescribeResponse { text }))
}
