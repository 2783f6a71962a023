//! Location domain module.
//!
//! Finds the files of a resource kind on disk or in the packaged namespace.
//!
//! ## Architecture
//!
//! - `pattern.rs` - `file:`/`classpath:` patterns, override rework, glob compilation
//! - `namespace.rs` - Directory scanning and the packaged namespace (directories, archives)
//! - `resolver.rs` - The four-tier `LocationResolver`
//! - `handle.rs` - `ResourceHandle`, the opaque handle given to registries

mod error;
mod handle;
mod namespace;
mod pattern;
mod resolver;

pub use error::LocationError;
pub use handle::ResourceHandle;
pub use namespace::{Matches, PackagedNamespace, PackagedRoot, scan_directory};
pub use pattern::{CLASSPATH_PREFIX, FILE_PREFIX, GlobPattern, LocationPattern, rework_path};
pub use resolver::{LocationResolver, Resolution, Tier};
