//! Resource kind definitions module.
//!
//! Each kind is defined in its own file with:
//! - its descriptor (type, description, path template, identifier policy)
//! - the backend registry it registers into
//!
//! ## Adding a New Kind
//!
//! 1. Create a new file (e.g., `my_kind.rs`)
//! 2. Implement the `ResourceKind` trait
//! 3. Export it here
//! 4. Add it to `default_kinds()` in `registry.rs`

mod binding;
mod daemon_script;
mod dataset_catalog;
mod groovy_script;
mod link;
mod message_bundle;
mod query_mapping;
mod report_template;
mod sql_query;
mod sql_statement;

pub use binding::BindingKind;
pub use daemon_script::DaemonScriptKind;
pub use dataset_catalog::DatasetCatalogKind;
pub use groovy_script::GroovyScriptKind;
pub use link::LinkKind;
pub use message_bundle::MessageBundleKind;
pub use query_mapping::QueryMappingKind;
pub use report_template::ReportTemplateKind;
pub use sql_query::SqlQueryKind;
pub use sql_statement::SqlStatementKind;

use super::descriptor::ResourceKindDescriptor;
use crate::domains::backends::BackendError;
use crate::domains::location::{LocationResolver, ResourceHandle};

/// Trait for resource kinds.
///
/// The orchestrator drives every kind through this trait only; it never
/// looks at the concrete type.
pub trait ResourceKind: Send + Sync {
    /// The kind's static description.
    fn descriptor(&self) -> &ResourceKindDescriptor;

    /// One-time setup, run before the kind's resources are located.
    fn prepare(&mut self, _resolver: &LocationResolver) -> Result<(), BackendError> {
        Ok(())
    }

    /// Whether `prepare` already loaded everything, so located files must
    /// not be registered one by one.
    fn loaded_by_setup(&self) -> bool {
        false
    }

    /// Register one located resource with the backing registry.
    fn register_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError>;

    /// Unregister a resource previously registered by this kind.
    fn unregister_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError>;

    /// Final cleanup, run after every resource has been unregistered.
    fn teardown(&mut self) {}
}
