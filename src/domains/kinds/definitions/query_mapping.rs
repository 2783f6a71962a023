//! Query to database mapping files.

use std::sync::Arc;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::ResourceKindDescriptor;
use crate::domains::location::ResourceHandle;

/// Files mapping queries to the database they run against.
pub struct QueryMappingKind {
    registry: Arc<dyn BackendRegistry>,
}

impl QueryMappingKind {
    /// Kind descriptor.
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("databaseMapping", "Queries Database mapping file", "/sql/**/queries-database.mapping");

    /// Create the kind, registering into `registry`.
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for QueryMappingKind {
    fn descriptor(&self) -> &ResourceKindDescriptor {
        &Self::DESCRIPTOR
    }

    fn register_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        self.registry.register(identifier, handle)
    }

    fn unregister_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        self.registry.unregister(identifier, handle)
    }
}
