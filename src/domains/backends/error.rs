//! Backend-specific error types.

use thiserror::Error;

/// Errors returned by backend registries.
///
/// Everything except [`BackendError::Fatal`] is recoverable: the orchestrator
/// logs it, skips the resource and carries on.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The registry refused this resource.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The registry is misconfigured; startup must abort.
    #[error("Fatal misconfiguration: {0}")]
    Fatal(String),

    /// The resource could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The resource is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new "rejected" error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a new "fatal" error.
    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// Whether this error must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}
