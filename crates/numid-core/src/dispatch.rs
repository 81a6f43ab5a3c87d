//! The seam between request handling and the model provider.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::UpstreamError;
use crate::gemini::types::{Content, Part};
use crate::sanitize::Conversation;

/// Everything one upstream call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub history: Vec<Content>,
    /// Parts of the pending user turn.
    pub turn: Vec<Part>,
}

impl GenerateRequest {
    /// A request with no history: a single user turn.
    pub fn single(model: impl Into<String>, turn: Vec<Part>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            history: Vec::new(),
            turn,
        }
    }

    /// A request continuing a sanitized conversation.
    pub fn from_conversation(model: impl Into<String>, conversation: Conversation) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            history: conversation.history,
            turn: conversation.turn,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// One item of an incremental response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Next piece of the answer; concatenate in arrival order.
    Fragment(String),
    /// Upstream finished. Carries the provider's full text, which callers
    /// should only compare against their accumulated fragments.
    Completed(String),
}

/// Incremental response. `Completed` or an error is always the last item.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send>>;

/// A generative model reachable over the network.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Send the request and wait for the complete answer.
    async fn generate(&self, request: GenerateRequest) -> Result<String, UpstreamError>;

    /// Send the request and receive the answer as it is produced.
    async fn generate_stream(&self, request: GenerateRequest) -> Result<FragmentStream, UpstreamError>;
}
