//! Error types and handling for the registrar.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies, providing consistent error handling
//! across the entire application.

use thiserror::Error;

/// A specialized Result type for registrar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the registrar.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the registration domain.
    #[error("Registration error: {0}")]
    Registration(#[from] crate::domains::registration::RegistrationError),

    /// Error originating from a backend registry.
    #[error("Backend error: {0}")]
    Backend(#[from] crate::domains::backends::BackendError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parsing errors.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether startup must abort.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Registration(crate::domains::registration::RegistrationError::Fatal { .. }) => true,
            Self::Backend(e) => e.is_fatal(),
            _ => false,
        }
    }
}
