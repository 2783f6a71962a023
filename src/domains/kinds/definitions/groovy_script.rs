//! Groovy script files.

use std::sync::Arc;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::ResourceKindDescriptor;
use crate::domains::location::ResourceHandle;

/// Groovy scripts, registered into the script registry.
pub struct GroovyScriptKind {
    registry: Arc<dyn BackendRegistry>,
}

impl GroovyScriptKind {
    /// Kind descriptor.
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("scripts", "groovy scripts", "/scripts/**/*.groovy");

    /// Create the kind, registering into `registry`.
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for GroovyScriptKind {
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
