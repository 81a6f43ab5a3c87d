//! Google Gemini implementation of [`Dispatcher`].
//!
//! Talks to the public REST API directly: `generateContent` for single-shot
//! answers and `streamGenerateContent?alt=sse` for incremental ones. No
//! retries are attempted; every failure is handed back to the caller.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use crate::dispatch::{Dispatcher, FragmentStream, GenerateRequest, StreamEvent};
use crate::error::UpstreamError;
use types::{Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Public endpoint of the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Fails when the HTTP client cannot be built, e.g. no TLS backend.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(concat!("numid/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// POST `body` and fail on any non-success status.
    async fn post(&self, url: &str, body: &GenerateContentRequest) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(raw);
        warn!(status = status.as_u16(), %message, "upstream rejected request");
        Err(UpstreamError::Api { status: status.as_u16(), message })
    }
}

fn build_body(request: GenerateRequest) -> GenerateContentRequest {
    let mut contents = request.history;
    contents.push(Content::new("user", request.turn));
    GenerateContentRequest {
        system_instruction: request
            .system_instruction
            .map(|text| Content { role: None, parts: vec![types::Part::text(text)] }),
        contents,
    }
}

/// Text of one response (or stream chunk), or the reason it was withheld.
fn response_text(response: &GenerateContentResponse) -> Result<String, UpstreamError> {
    match response.block_reason() {
        Some(reason) => Err(UpstreamError::Blocked(reason)),
        None => Ok(response.text()),
    }
}

#[async_trait]
impl Dispatcher for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, UpstreamError> {
        let url = self.url(&request.model, "generateContent");
        debug!(model = %request.model, history = request.history.len(), "generateContent");

        let body = build_body(request);
        let raw = self.post(&url, &body).await?.text().await?;
        let response: GenerateContentResponse = serde_json::from_str(&raw)?;
        response_text(&response)
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<FragmentStream, UpstreamError> {
        let url = format!("{}?alt=sse", self.url(&request.model, "streamGenerateContent"));
        debug!(model = %request.model, history = request.history.len(), "streamGenerateContent");

        let body = build_body(request);
        let events = Box::pin(self.post(&url, &body).await?.bytes_stream().eventsource());

        // State: the open event stream plus the text seen so far; `None` once
        // a terminal item has been yielded.
        let stream = futures::stream::unfold(Some((events, String::new())), |state| async move {
            let (mut events, mut full) = state?;
            loop {
                let event = match events.next().await {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => return Some((Err(UpstreamError::Stream(e.to_string())), None)),
                    None => return Some((Ok(StreamEvent::Completed(full)), None)),
                };

                let text = serde_json::from_str::<GenerateContentResponse>(&event.data)
                    .map_err(UpstreamError::from)
                    .and_then(|chunk| response_text(&chunk));
                match text {
                    Ok(text) if text.is_empty() => continue,
                    Ok(text) => {
                        full.push_str(&text);
                        return Some((Ok(StreamEvent::Fragment(text)), Some((events, full))));
                    }
                    Err(e) => return Some((Err(e), None)),
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
