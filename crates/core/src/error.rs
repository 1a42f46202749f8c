//! Unified error types for pagedate.
//!
//! Variants follow the failure taxonomy of the extraction engine. None of them
//! escape a single-document extraction call: the extractors degrade each one
//! to a not-found result.

/// Unified error types for pagedate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty document list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The HTML could not be turned into a document tree.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// A candidate string is not a calendar date.
    #[error("UNPARSEABLE_DATE: {0}")]
    UnparseableDate(String),

    /// Chat endpoint returned an error status or an unreadable body.
    #[error("TRANSPORT_FAILED: {0}")]
    TransportFailed(String),

    /// Model reply did not match the required output grammar.
    #[error("SCHEMA_VIOLATION: {0}")]
    SchemaViolation(String),

    /// Retry budget used up.
    #[error("EXHAUSTED: {attempts} attempts failed")]
    Exhausted { attempts: u32 },
}
