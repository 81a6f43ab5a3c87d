//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a `{"error": message}`
//! JSON body with the matching status code.
//!
//! Upstream failures are passed through to the caller verbatim: the message
//! comes from the model provider and is what a user needs to fix their key,
//! quota or prompt.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use numid_core::{SanitizeError, UpstreamError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// The conversation cannot be turned into an upstream request.
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    /// The model provider failed or refused the request.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The model answered, but not in the shape the endpoint promises.
    #[error("{0}")]
    UnprocessableContent(String),

    /// The request body exceeds `NUMID_BODY_LIMIT`.
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::Sanitize(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::UnprocessableContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the caller. Logs upstream failures on the way.
    pub fn client_message(&self) -> String {
        match self {
            ServerError::BadRequest(m) | ServerError::PayloadTooLarge(m) | ServerError::UnprocessableContent(m) => {
                m.clone()
            }
            ServerError::Sanitize(e) => e.to_string(),
            ServerError::Upstream(e) => {
                error!(error = %e, "upstream request failed");
                e.to_string()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.client_message();
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
