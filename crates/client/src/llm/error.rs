//! LLM client error types.

use std::sync::Arc;

use pagedate_core::Error;

/// Errors from the chat completions client and reply parser.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP error response.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body is not a chat completion.
    #[error("non-JSON response: {0}")]
    NonJson(String),

    /// Reply carries no `<JSON>...</JSON>` block.
    #[error("reply has no <JSON> block")]
    MissingBlock,

    /// Tagged block is not a JSON object.
    #[error("invalid JSON in reply: {0}")]
    InvalidJson(String),

    /// JSON object does not match the required fields and values.
    #[error("schema violation: {0}")]
    Schema(String),

    /// Extractor used after `close`.
    #[error("extractor session is closed")]
    SessionClosed,
}

impl LlmError {
    /// Whether this error consumes one attempt of the retry budget.
    ///
    /// Only a closed session is a contract violation; everything else is a
    /// transport or schema failure.
    pub fn is_attempt_failure(&self) -> bool {
        !matches!(self, LlmError::SessionClosed)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { LlmError::Timeout } else { LlmError::Network(Arc::new(err)) }
    }
}

impl From<LlmError> for Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http { .. } | LlmError::Timeout | LlmError::Network(_) | LlmError::NonJson(_) => {
                Error::TransportFailed(err.to_string())
            }
            LlmError::MissingBlock | LlmError::InvalidJson(_) | LlmError::Schema(_) => {
                Error::SchemaViolation(err.to_string())
            }
            LlmError::SessionClosed => Error::InvalidInput(err.to_string()),
        }
    }
}
