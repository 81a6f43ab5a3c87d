//! numid-core: everything between an incoming chat request and the upstream
//! model.
//!
//! - [`attachment`] unpacks data URIs into inline upstream parts.
//! - [`role`] maps application roles onto the upstream vocabulary.
//! - [`sanitize`] turns a raw message list into history + final turn.
//! - [`dispatch`] defines the [`Dispatcher`] seam; [`gemini`] implements it.
//! - [`relay`] converts an upstream fragment stream into SSE frames.
//! - [`svg`] post-processes model output for the SVG endpoint.

pub mod attachment;
pub mod dispatch;
pub mod error;
pub mod gemini;
pub mod relay;
pub mod role;
pub mod sanitize;
pub mod svg;

pub use dispatch::{Dispatcher, FragmentStream, GenerateRequest, StreamEvent};
pub use error::{SanitizeError, UpstreamError};
pub use gemini::GeminiClient;
pub use relay::{Frame, Relay, RelayState};
pub use sanitize::{sanitize, Conversation};

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// MIME type assumed for inline data that carries none.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Prompt used by the vision endpoint when the caller sends none.
pub const DEFAULT_VISION_PROMPT: &str = "Describe this image in detail.";

/// System instruction sent with every upstream call unless overridden.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a concise, helpful AI. Use Markdown formatting with headings, lists, and bold where useful. Understand and respond in the user's language automatically (Bangla, Banglish, English). Keep answers clear; use bullet points for steps/lists; include short code blocks when appropriate.";
