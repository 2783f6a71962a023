//! Link (alias) files.

use std::sync::Arc;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::ResourceKindDescriptor;
use crate::domains::location::ResourceHandle;

/// Link files declaring aliases between programs.
pub struct LinkKind {
    registry: Arc<dyn BackendRegistry>,
}

impl LinkKind {
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("lnk", "lnk files", "/lnk/*.json");

    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for LinkKind {
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
