//! Program binding files.

use std::sync::Arc;
use tracing::debug;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::ResourceKindDescriptor;
use crate::domains::location::ResourceHandle;

/// Program binding files.
///
/// Bindings are dropped as a whole: unregistering any binding clears the
/// binding registry.
pub struct BindingKind {
    registry: Arc<dyn BackendRegistry>,
}

impl BindingKind {
    /// Kind descriptor.
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("bindings", "program bindings files", "/bindings/*.json");

    /// Create the kind, registering into `registry`.
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for BindingKind {
    fn descriptor(&self) -> &ResourceKindDescriptor {
        &Self::DESCRIPTOR
    }

    fn register_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        self.registry.register(identifier, handle)
    }

    fn unregister_backend(&self, identifier: &str, _handle: &ResourceHandle) -> Result<(), BackendError> {
        if !self.registry.is_empty() {
            debug!("Clearing all bindings (unregistering {identifier})");
            self.registry.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::JsonRegistry;
    use std::fs;

    #[test]
    fn test_unregister_clears_all_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JsonRegistry::new("bindings"));
        let kind = BindingKind::new(registry.clone());

        let mut handles = Vec::new();
        for name in ["MAIN", "BATCH"] {
            let path = dir.path().join(format!("{name}.json"));
            fs::write(&path, r#"{"program": "HELLO"}"#).unwrap();
            let handle = ResourceHandle::file(path);
            kind.register_backend(name, &handle).unwrap();
            handles.push(handle);
        }
        assert_eq!(registry.len(), 2);

        kind.unregister_backend("MAIN", &handles[0]).unwrap();
        assert!(registry.is_empty());

        // Second unregister finds nothing left to clear.
        kind.unregister_backend("BATCH", &handles[1]).unwrap();
        assert!(registry.is_empty());
    }
}
