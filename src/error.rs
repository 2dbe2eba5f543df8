//! Error types for Twelfbox

use thiserror::Error;

/// Result type alias using Twelfbox's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Twelfbox
///
/// These are infrastructure failures. A non-conformant checker transcript is
/// not an `Error` — see [`crate::transcript::ProtocolViolation`], which is
/// recovered locally into a structured response value.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sandbox directory error
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    /// Checker invocation error (spawn/capture, not checker semantics)
    #[error("Checker error: {0}")]
    Checker(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
