//! Kind-specific error types.

use thiserror::Error;

/// Errors raised while turning a located resource into a registry key.
#[derive(Debug, Error)]
pub enum KindError {
    /// The handle has no usable file name.
    #[error("Resource has no file name: {0}")]
    MissingFileName(String),

    /// Extension stripping left nothing (e.g. `.sql`).
    #[error("Empty identifier derived from {0}")]
    EmptyIdentifier(String),
}
