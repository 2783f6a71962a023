//! Location-specific error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving a location pattern.
///
/// The resolver never propagates these past a tier: they only explain why a
/// tier produced no matches.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The fixed (non-wildcard) part of the pattern does not exist.
    #[error("Base path not found: {0}")]
    BaseNotFound(PathBuf),

    /// The glob part of the pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A `classpath:` pattern was requested but no packaged roots are configured.
    #[error("No packaged roots configured")]
    NoPackagedRoots,

    /// An I/O error occurred while walking a directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A packaged archive could not be opened or listed.
    #[cfg(feature = "archive")]
    #[error("Archive error in {archive}: {source}")]
    Archive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl LocationError {
    /// Create a new "invalid pattern" error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}
