//! Text-to-image as SVG markup (`POST /api/images/svg`).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use numid_core::gemini::types::Part;
use numid_core::svg::{extract_svg, svg_prompt};
use numid_core::GenerateRequest;
use tracing::{info, warn};
use utoipa::OpenApi;

use super::{json_body, non_empty};
use crate::error::ServerError;
use crate::schemas::chat::ErrorBody;
use crate::schemas::images::SvgRequest;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(generate_svg), components(schemas(SvgRequest)))]
pub struct ImagesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/images/svg", post(generate_svg))
}

/// Ask the model for a standalone SVG and return it as `image/svg+xml`.
#[utoipa::path(
    post,
    path = "/api/images/svg",
    tag = "images",
    request_body = SvgRequest,
    responses(
        (status = 200, description = "SVG document", content_type = "image/svg+xml", body = String),
        (status = 400, description = "No prompt", body = ErrorBody),
        (status = 422, description = "Model output was not SVG", body = ErrorBody),
        (status = 500, description = "Upstream error", body = ErrorBody),
    )
)]
pub async fn generate_svg(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SvgRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let req = json_body(payload)?;
    let prompt = non_empty(req.prompt).ok_or_else(|| ServerError::BadRequest("prompt is required".into()))?;
    let model = state.model_or_default(req.model);

    let request = GenerateRequest::single(model.clone(), vec![Part::text(svg_prompt(&prompt))])
        .with_system_instruction(state.config.system_prompt.clone());
    let raw = state.dispatcher.generate(request).await?;

    let Some(svg) = extract_svg(&raw) else {
        warn!(%model, output_len = raw.len(), "model output is not SVG");
        return Err(ServerError::UnprocessableContent("model did not return SVG".into()));
    };

    info!(%model, svg_len = svg.len(), "svg generated");
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}
