//! Registration-specific error types.

use thiserror::Error;

use crate::domains::backends::BackendError;

/// Errors that abort a registration pass.
///
/// Per-file problems never surface here; they are logged and skipped.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Two kinds with the same type key were added to one orchestrator.
    #[error("Duplicate resource kind: {0}")]
    DuplicateKind(String),

    /// A backend reported a fatal misconfiguration.
    #[error("Fatal error registering {kind} resource {resource}: {source}")]
    Fatal {
        kind: String,
        resource: String,
        #[source]
        source: BackendError,
    },
}

impl RegistrationError {
    /// Create a new "fatal" error.
    pub fn fatal(kind: impl Into<String>, resource: impl Into<String>, source: BackendError) -> Self {
        Self::Fatal {
            kind: kind.into(),
            resource: resource.into(),
            source,
        }
    }
}
