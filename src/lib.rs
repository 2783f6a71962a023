//! Resource Registrar Library
//!
//! Discovers resource files (SQL, scripts, report templates, JSON catalogs,
//! message bundles, ...) on disk or in a packaged namespace and registers
//! them into per-kind backend registries at startup, unregistering them at
//! shutdown.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling and the registration lifecycle
//! - **domains**: Business logic organized by bounded contexts
//!   - **location**: tiered lookup of a kind's files
//!   - **kinds**: the resource kinds and their identifier policies
//!   - **backends**: the registries resources are registered into
//!   - **registration**: the orchestrator driving every kind
//!
//! # Example
//!
//! ```rust,no_run
//! use resource_registrar::{Bootstrap, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env().with_args(std::env::args());
//!     let mut bootstrap = Bootstrap::new(config);
//!     let summary = bootstrap.start()?;
//!     println!("{} resources registered", summary.registration.registered());
//!     bootstrap.stop();
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Bootstrap, Config, Error, Result};
