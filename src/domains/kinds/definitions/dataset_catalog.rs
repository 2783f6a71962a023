//! Dataset catalog entries.

use std::sync::Arc;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::{IdentifierPolicy, ResourceKindDescriptor};
use crate::domains::location::ResourceHandle;

/// Dataset catalog entries. Only the last extension is stripped so dotted dataset names survive.
pub struct DatasetCatalogKind {
    registry: Arc<dyn BackendRegistry>,
}

impl DatasetCatalogKind {
    /// Kind descriptor.
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("catalog", "Dataset Catalog", "/catalog/*.json")
            .with_identifier_policy(IdentifierPolicy::StripLastExtension);

    /// Create the kind, registering into `registry`.
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for DatasetCatalogKind {
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
