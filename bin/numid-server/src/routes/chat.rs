//! Chat routes: single-shot and Server-Sent-Events streaming.
//!
//! Both take the full conversation on every call; the server keeps no
//! history. The streaming route always answers with an event stream, even
//! when the request is rejected, so a client reading SSE sees every failure
//! as an `event: error` frame.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::{stream, StreamExt};
use numid_core::{relay, sanitize, Frame, GenerateRequest};
use numid_types::Message;
use serde_json::Value;
use tracing::{debug, info};
use utoipa::OpenApi;

use super::json_body;
use crate::error::ServerError;
use crate::schemas::chat::{ChatReply, ChatRequest, ErrorBody};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(chat, chat_stream),
    components(schemas(ChatRequest, ChatReply, ErrorBody, Message))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
}

/// Complete chat turn (`POST /api/chat`).
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model reply", body = ChatReply),
        (status = 400, description = "Malformed or empty conversation", body = ErrorBody),
        (status = 500, description = "Upstream error", body = ErrorBody),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ServerError> {
    let request = prepare(&state, json_body(payload)?)?;
    let model = request.model.clone();

    let reply = state.dispatcher.generate(request).await?;

    info!(%model, reply_len = reply.len(), "chat reply generated");
    Ok(Json(ChatReply { reply }))
}

/// Streaming chat turn (`POST /api/chat/stream`).
///
/// Emits one `data:` frame per fragment (a JSON string), then `event: done`
/// with the full text, or `event: error` with a message.
#[utoipa::path(
    post,
    path = "/api/chat/stream",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Event stream of reply fragments", content_type = "text/event-stream", body = String),
        (status = 400, description = "Malformed or empty conversation; a single error frame", content_type = "text/event-stream", body = String),
        (status = 500, description = "Upstream refused the call; a single error frame", content_type = "text/event-stream", body = String),
    )
)]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload).and_then(|body| prepare(&state, body)) {
        Ok(request) => request,
        Err(e) => return error_stream(e),
    };
    let model = request.model.clone();

    let upstream = match state.dispatcher.generate_stream(request).await {
        Ok(upstream) => upstream,
        Err(e) => return error_stream(e.into()),
    };

    info!(%model, "chat stream opened");
    let frames = relay::spawn(upstream, state.config.stream_buffer);
    Sse::new(frames.map(|frame| Ok::<_, Infallible>(to_event(&frame)))).into_response()
}

/// Validate the body and build the upstream request.
fn prepare(state: &AppState, body: ChatRequest) -> Result<GenerateRequest, ServerError> {
    let messages = parse_messages(body.messages)?;
    let conversation = sanitize(&messages)?;
    let model = state.model_or_default(body.model);

    debug!(
        %model,
        received = messages.len(),
        history = conversation.history.len(),
        "conversation sanitized"
    );

    Ok(GenerateRequest::from_conversation(model, conversation)
        .with_system_instruction(state.config.system_prompt.clone()))
}

fn parse_messages(value: Value) -> Result<Vec<Message>, ServerError> {
    if !value.is_array() {
        return Err(ServerError::BadRequest("messages must be an array".into()));
    }
    serde_json::from_value(value).map_err(|e| ServerError::BadRequest(format!("invalid message: {e}")))
}

fn to_event(frame: &Frame) -> Event {
    let event = match frame.event() {
        Some(name) => Event::default().event(name),
        None => Event::default(),
    };
    event.data(frame.data())
}

/// A complete event stream holding one error frame.
fn error_stream(err: ServerError) -> Response {
    let status = err.status();
    let frame = Frame::Error(err.client_message());
    let body = Sse::new(stream::once(async move { Ok::<_, Infallible>(to_event(&frame)) }));
    (status, body).into_response()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
