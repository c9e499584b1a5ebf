//! Error types for the sandbox

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors raised while assembling the sandbox from configuration.
///
/// Nothing in the execution path returns these: once a service is built,
/// every request resolves to an [`ExecutionOutcome`](crate::ExecutionOutcome)
/// or a [`ProtocolError`].
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid screening pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed execution request. Distinct from a screening rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Missing code")]
    MissingCode,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::InvalidBody(e.to_string())
    }
}
