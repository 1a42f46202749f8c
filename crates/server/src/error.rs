//! Structured errors for the pagedate MCP server.
//!
//! Maps engine failures onto JSON-RPC error codes.

use pagedate_client::LlmError;
use pagedate_core::Error;
use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the pagedate MCP server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid input parameters (e.g., empty HTML, bad cutoff date).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Deterministic extraction failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// LLM extractor could not be used.
    #[error("LLM_FAILED: {0}")]
    LlmFailed(String),
}

impl From<Error> for ToolError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => ToolError::InvalidInput(msg),
            Error::ParseFailed(_) | Error::UnparseableDate(_) => ToolError::ExtractFailed(err.to_string()),
            Error::TransportFailed(_) | Error::SchemaViolation(_) | Error::Exhausted { .. } => {
                ToolError::LlmFailed(err.to_string())
            }
        }
    }
}

impl From<LlmError> for ToolError {
    fn from(err: LlmError) -> Self {
        ToolError::LlmFailed(err.to_string())
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) => -32602,
            ToolError::ExtractFailed(_) => -32000,
            ToolError::LlmFailed(_) => -32003,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
