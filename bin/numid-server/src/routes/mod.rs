//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - middleware layers (CORS, per-request trace id, body limit)
//! - the OpenAPI document (disable with `NUMID_ENABLE_DOCS=false`)
//! - `/health`
//! - the `/api` chat, vision and image routes

mod chat;
pub mod doc;
mod health;
mod images;
mod vision;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Json, Router};
use tower::ServiceBuilder;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(chat::router())
        .merge(vision::router())
        .merge(images::router());

    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", api_router);

    if state.config.enable_docs {
        let api_doc = doc::get_docs();
        app = app.route("/api-docs/openapi.json", get(move || async move { Json(api_doc) }));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .layer(DefaultBodyLimit::max(state.config.body_limit))
        .with_state(state)
}

/// Unwrap a JSON body. An over-limit body is a 413, any other rejection a 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload.map(|Json(body)| body).map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ServerError::PayloadTooLarge(rejection.body_text()),
        _ => ServerError::BadRequest(rejection.body_text()),
    })
}

/// Treat `Some("")` like `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A router wired to a scripted [`Dispatcher`], plus request helpers.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use axum::Router;
    use futures::{stream, StreamExt};
    use http_body_util::BodyExt;
    use numid_core::{Dispatcher, FragmentStream, GenerateRequest, StreamEvent, UpstreamError};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::state::AppState;

    /// Replies from a script and records every request it receives.
    #[derive(Default)]
    pub struct ScriptedDispatcher {
        /// `Err` text becomes an upstream API error.
        pub reply: Option<Result<String, String>>,
        /// Items of the fragment stream; `Err` text becomes a stream error.
        pub stream: Vec<Result<StreamEvent, String>>,
        /// Fail before any fragment is produced.
        pub stream_open_error: Option<String>,
        /// Leave the fragment stream pending after its scripted items.
        pub hold_open: bool,
        pub seen: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedDispatcher {
        pub fn replying(text: &str) -> Self {
            Self { reply: Some(Ok(text.to_owned())), ..Self::default() }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Some(Err(message.to_owned())),
                stream_open_error: Some(message.to_owned()),
                ..Self::default()
            }
        }

        pub fn streaming(items: Vec<Result<StreamEvent, String>>) -> Self {
            Self { stream: items, ..Self::default() }
        }

        pub fn requests(&self) -> Vec<GenerateRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn api_error(message: &str) -> UpstreamError {
        UpstreamError::Api { status: 400, message: message.to_owned() }
    }

    #[async_trait]
    impl Dispatcher for ScriptedDispatcher {
        async fn generate(&self, request: GenerateRequest) -> Result<String, UpstreamError> {
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(api_error(message)),
                None => Ok(String::new()),
            }
        }

        async fn generate_stream(&self, request: GenerateRequest) -> Result<FragmentStream, UpstreamError> {
            self.seen.lock().unwrap().push(request);
            if let Some(message) = &self.stream_open_error {
                return Err(api_error(message));
            }
            let items: Vec<_> = self
                .stream
                .iter()
                .cloned()
                .map(|item| item.map_err(UpstreamError::Stream))
                .collect();
            if self.hold_open {
                return Ok(Box::pin(stream::iter(items).chain(stream::pending())));
            }
            Ok(Box::pin(stream::iter(items)))
        }
    }

    pub fn app(dispatcher: Arc<ScriptedDispatcher>) -> Router {
        app_with(Config::default(), dispatcher)
    }

    pub fn app_with(config: Config, dispatcher: Arc<ScriptedDispatcher>) -> Router {
        let state = Arc::new(AppState { config: Arc::new(config), dispatcher });
        super::build(state)
    }

    pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, HeaderMap, String) {
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
