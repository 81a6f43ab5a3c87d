use thiserror::Error;

/// Reasons a message list cannot be turned into an upstream request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// Nothing left after dropping the leading non-user turns.
    #[error("no user messages provided")]
    NoUserMessages,

    /// The pending turn is not attributed to the user.
    #[error("last message must be from user")]
    TrailingNonUser,
}

/// Errors raised while talking to the upstream model provider.
///
/// The `Display` text is what callers see, so each variant keeps the
/// provider's own wording where there is one.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, TLS failure, timeout, or an unreadable body.
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("upstream error {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider refused to produce text for this prompt.
    #[error("response was blocked: {0}")]
    Blocked(String),

    /// The provider answered with JSON we could not decode.
    #[error("invalid upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The incremental response broke off mid-stream.
    #[error("upstream stream failed: {0}")]
    Stream(String),
}
