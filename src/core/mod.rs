//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks of the registrar:
//! error handling, configuration and the registration lifecycle.

pub mod bootstrap;
pub mod config;
pub mod error;

pub use bootstrap::{Bootstrap, StartupSummary};
pub use config::Config;
pub use error::{Error, Result};
