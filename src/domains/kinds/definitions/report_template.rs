//! Report template files.

use std::sync::Arc;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::ResourceKindDescriptor;
use crate::domains::location::ResourceHandle;

/// Jasper report templates.
pub struct ReportTemplateKind {
    registry: Arc<dyn BackendRegistry>,
}

impl ReportTemplateKind {
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("templates", "Jasper resource files", "/templates/**/*.jrxml");

    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for ReportTemplateKind {
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
