//! HTTP client for the numid-server `/api` routes.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use numid_types::Message;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an `{"error": ...}` body.
    #[error("{0}")]
    Server(String),

    /// The server answered with something other than JSON.
    #[error("{0}")]
    Unexpected(String),

    /// The event stream ended with an error frame or broke mid-way.
    #[error("{0}")]
    Stream(String),

    #[error("invalid server response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    text: String,
}

/// Talks to one numid-server with one model.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    model: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("numid-cli/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send the conversation and return the full reply, streaming when the
    /// server supports it. `on_fragment` sees each streamed piece as it
    /// arrives; it is not called when the JSON fallback answers.
    pub async fn send(&self, messages: &[Message], on_fragment: impl FnMut(&str)) -> Result<String, ClientError> {
        let res = self
            .http
            .post(self.url("/api/chat/stream"))
            .header(ACCEPT, "text/event-stream")
            .json(&json!({ "messages": messages, "model": self.model }))
            .send()
            .await;

        match res {
            Ok(res) if res.status().is_success() && is_event_stream(&res) => read_stream(res, on_fragment).await,
            Ok(res) => {
                debug!(status = res.status().as_u16(), "stream unavailable; falling back to /api/chat");
                self.chat(messages).await
            }
            Err(e) => {
                warn!(error = %e, "stream request failed; falling back to /api/chat");
                self.chat(messages).await
            }
        }
    }

    /// Single-shot chat (`POST /api/chat`).
    pub async fn chat(&self, messages: &[Message]) -> Result<String, ClientError> {
        let res = self
            .http
            .post(self.url("/api/chat"))
            .json(&json!({ "messages": messages, "model": self.model }))
            .send()
            .await?;
        let reply: ChatReply = read_json(res).await?;
        Ok(reply.reply)
    }

    /// Describe an image (`POST /api/vision/describe`).
    pub async fn describe(&self, data_uri: &str, mime_type: &str, prompt: Option<&str>) -> Result<String, ClientError> {
        let mut body = json!({ "dataUri": data_uri, "mimeType": mime_type, "model": self.model });
        if let Some(prompt) = prompt {
            body["prompt"] = json!(prompt);
        }
        let res = self.http.post(self.url("/api/vision/describe")).json(&body).send().await?;
        let described: DescribeResponse = read_json(res).await?;
        Ok(described.text)
    }

    /// Generate an SVG document (`POST /api/images/svg`).
    pub async fn svg(&self, prompt: &str) -> Result<String, ClientError> {
        let res = self
            .http
            .post(self.url("/api/images/svg"))
            .json(&json!({ "prompt": prompt, "model": self.model }))
            .send()
            .await?;
        if res.status().is_success() {
            return Ok(res.text().await?);
        }
        Err(error_of(res).await)
    }
}

fn content_type(res: &Response) -> &str {
    res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("")
}

fn is_event_stream(res: &Response) -> bool {
    content_type(res).contains("text/event-stream")
}

/// Accumulate `data:` frames until `event: done`, the end of the body or an
/// `event: error` frame.
async fn read_stream(res: Response, mut on_fragment: impl FnMut(&str)) -> Result<String, ClientError> {
    let mut events = res.bytes_stream().eventsource();
    let mut reply = String::new();

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| ClientError::Stream(e.to_string()))?;
        match event.event.as_str() {
            "done" => {
                debug!(len = reply.len(), "stream done");
                break;
            }
            "error" => {
                let message = serde_json::from_str::<String>(&event.data).unwrap_or(event.data);
                return Err(ClientError::Stream(message));
            }
            _ => match serde_json::from_str::<String>(&event.data) {
                Ok(fragment) => {
                    on_fragment(&fragment);
                    reply.push_str(&fragment);
                }
                Err(e) => debug!(error = %e, data = %event.data, "skipping undecodable frame"),
            },
        }
    }

    Ok(reply)
}

async fn read_json<T: serde::de::DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    if !res.status().is_success() {
        return Err(error_of(res).await);
    }
    if !content_type(&res).contains("application/json") {
        let status = res.status();
        let text = res.text().await?;
        return Err(ClientError::Unexpected(non_empty_or(text, format!("HTTP {}", status.as_u16()))));
    }
    Ok(serde_json::from_slice(&res.bytes().await?)?)
}

/// The server's `{"error": ...}` message, or the raw body.
async fn error_of(res: Response) -> ClientError {
    let status = res.status();
    let is_json = content_type(&res).contains("application/json");
    let text = match res.text().await {
        Ok(text) => text,
        Err(e) => return ClientError::Http(e),
    };
    if is_json {
        if let Ok(ErrorBody { error: Some(message) }) = serde_json::from_str(&text) {
            return ClientError::Server(message);
        }
        return ClientError::Server("Request failed".to_owned());
    }
    ClientError::Unexpected(non_empty_or(text, format!("HTTP {}", status.as_u16())))
}

fn non_empty_or(text: String, fallback: String) -> String {
    if text.trim().is_empty() { fallback } else { text }
}
