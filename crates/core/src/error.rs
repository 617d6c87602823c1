//! Error types for the Alembic domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Validation failures are
//! the only hard errors in this crate: stale or misaddressed directives are
//! recoverable conditions handled by the condenser, never surfaced as errors.

use thiserror::Error;

/// The top-level error type for all Alembic operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Directive validation ---
    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected directive input. Raised synchronously before any log append;
/// a directive that fails validation is never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("no addressing field supplied; provide exactly one of event_id, call_id, message_index")]
    MissingTarget,

    #[error("conflicting addressing fields; provide exactly one of event_id, call_id, message_index")]
    ConflictingTargets,

    #[error("summary cannot be empty or whitespace only")]
    EmptySummary,

    #[error("summary must be at most {max} characters")]
    SummaryTooLong { max: usize },

    #[error("message_index cannot be negative")]
    NegativeIndex,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Rejected directive: {0}")]
    Directive(#[from] DirectiveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_error_displays_limit() {
        let err = Error::Directive(DirectiveError::SummaryTooLong { max: 1028 });
        assert!(err.to_string().contains("1028"));
    }

    #[test]
    fn tool_error_wraps_directive_error() {
        let err: ToolError = DirectiveError::MissingTarget.into();
        assert!(err.to_string().contains("exactly one"));
    }
}
