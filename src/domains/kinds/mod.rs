//! Kinds domain module.
//!
//! A resource kind is a category of artifact (SQL file, script, report
//! template, ...) with its own path template, identifier policy and backing
//! registry.
//!
//! ## Architecture
//!
//! - `descriptor.rs` - `ResourceKindDescriptor` and the identifier policies
//! - `identifier.rs` - Registry key derivation
//! - `definitions/` - One file per kind, implementing `ResourceKind`
//! - `registry.rs` - The built-in kinds in registration order
//!
//! ## Adding a New Kind
//!
//! 1. Create a new file in `definitions/`
//! 2. Implement the `ResourceKind` trait
//! 3. Export in `definitions/mod.rs`
//! 4. Add it to `default_kinds()` in `registry.rs`
//!
//! **No need to modify the orchestrator!**

pub mod definitions;
mod descriptor;
mod error;
mod identifier;
mod registry;

pub use definitions::ResourceKind;
pub use descriptor::{CONFIGURATION_PREFIX, IdentifierPolicy, PathPrefixPolicy, ResourceKindDescriptor};
pub use error::KindError;
pub use identifier::{derive_identifier, strip_extensions};
pub use registry::default_kinds;
