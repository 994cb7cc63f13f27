//! Error types for search parameter assertions.

/// Errors raised while resolving searches, building reference queries or
/// evaluating assertions.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The session (or tuple) holds no recorded search. The code under test
    /// never ran a search, which is a test setup bug.
    #[error("no search found")]
    NoSearchFound,
    #[error("unsupported search operation: {0}")]
    UnsupportedOperation(String),
    #[error("invalid arguments for `{operation}`: {reason}")]
    InvalidArguments {
        operation: &'static str,
        reason: String,
    },
    /// An assertion evaluated to false; carries the rendered diagnostic.
    #[error("{0}")]
    AssertionFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize recording: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MatchError {
    pub(crate) fn invalid_args(operation: &'static str, reason: impl Into<String>) -> Self {
        MatchError::InvalidArguments {
            operation,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
