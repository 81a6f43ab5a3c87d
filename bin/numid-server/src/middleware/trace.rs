//! Per-request span, trace id and body logging.
//!
//! Bodies are only buffered for logging when they are small JSON with a known
//! length. Everything else, event streams and SVG included, passes through
//! untouched so streaming responses are never held back.

use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Largest body, in bytes, that is copied into the log.
const LOG_BODY_LIMIT: u64 = 1024;

pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (mut parts, body) = req.into_parts();
        let body = log_body("request", &parts.headers, body).await;
        if let Some(v) = &header_value {
            parts.headers.insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(Request::from_parts(parts, body)).await;

        let (mut parts, body) = response.into_parts();
        let body = log_body("response", &parts.headers, body).await;
        if let Some(v) = header_value {
            parts.headers.insert(X_TRACE_ID, v);
        }

        info!(
            status = parts.status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        Response::from_parts(parts, body)
    }
    .instrument(span)
    .await
}

/// Log a small JSON body and hand back an equivalent one. Other bodies are
/// returned as-is without being read.
async fn log_body(direction: &str, headers: &HeaderMap, body: Body) -> Body {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let size = body.size_hint().exact();

    let small_json = content_type.contains("application/json") && size.is_some_and(|n| n <= LOG_BODY_LIMIT);
    if !small_json {
        if let Some(n) = size.filter(|n| *n > 0) {
            debug!(direction, content_type, size = n, "body not logged");
        }
        return body;
    }

    match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            if let Ok(text) = std::str::from_utf8(&bytes) {
                debug!(direction, body = text, "body");
            }
            Body::from(bytes)
        }
        Err(e) => {
            warn!(direction, error = %e, "failed to read body");
            Body::empty()
        }
    }
}

#[cfg(test)]
mod test {
    use axum::{routing::get, Router};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/json", get(|| async { axum::Json(serde_json::json!({ "ok": true })) }))
            .layer(axum::middleware::from_fn(trace_middleware))
    }

    #[tokio::test]
    async fn assigns_trace_id_when_missing() {
        let resp = app()
            .oneshot(axum::http::Request::get("/json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = resp.headers().get(X_TRACE_ID).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn keeps_caller_trace_id() {
        let id = Uuid::new_v4().to_string();
        let resp = app()
            .oneshot(axum::http::Request::get("/json").header(X_TRACE_ID, &id).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.headers().get(X_TRACE_ID).unwrap(), id.as_str());
    }

    #[traced_test]
    #[tokio::test]
    async fn bodies_are_logged_at_debug() {
        app()
            .oneshot(axum::http::Request::get("/json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        logs_assert(|lines: &[&str]| {
            let body_lines: Vec<_> = lines.iter().filter(|l| l.contains("direction=\"response\"")).collect();
            if body_lines.is_empty() {
                return Err("response body was not logged".to_owned());
            }
            if body_lines.iter().any(|l| !l.contains("DEBUG")) {
                return Err(format!("body logged above debug: {body_lines:?}"));
            }
            Ok(())
        });
    }
}
