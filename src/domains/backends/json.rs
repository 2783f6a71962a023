//! JSON document registry.
//!
//! Dataset catalogs, link files and program bindings are JSON documents. They
//! are parsed on registration; malformed files are rejected.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BackendError, BackendRegistry};
use crate::domains::location::ResourceHandle;

#[derive(Debug, Clone)]
struct JsonEntry {
    handle: ResourceHandle,
    document: Value,
}

/// Thread-safe registry of parsed JSON documents.
#[derive(Debug)]
pub struct JsonRegistry {
    name: &'static str,
    entries: RwLock<HashMap<String, JsonEntry>>,
}

impl JsonRegistry {
    /// Create an empty registry.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The document registered under `identifier`.
    pub fn document(&self, identifier: &str) -> Option<Value> {
        self.read().get(identifier).map(|entry| entry.document.clone())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, JsonEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, JsonEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BackendRegistry for JsonRegistry {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        let bytes = handle.read()?;
        let document: Value = serde_json::from_slice(&bytes)?;
        self.write().insert(
            identifier.to_string(),
            JsonEntry {
                handle: handle.clone(),
                document,
            },
        );
        Ok(())
    }

    fn unregister(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        let mut entries = self.write();
        if entries.get(identifier).is_some_and(|entry| entry.handle == *handle) {
            entries.remove(identifier);
        }
        Ok(())
    }

    fn contains(&self, identifier: &str) -> bool {
        self.read().contains_key(identifier)
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn clear(&self) {
        self.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_register_parses_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CUSTOMERS.json");
        fs::write(&path, r#"{"dataset": "CUSTOMERS", "recordSize": 80}"#).unwrap();

        let registry = JsonRegistry::new("datasets");
        registry.register("CUSTOMERS", &ResourceHandle::file(&path)).unwrap();

        let document = registry.document("CUSTOMERS").unwrap();
        assert_eq!(document["recordSize"], 80);
    }

    #[test]
    fn test_register_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let registry = JsonRegistry::new("links");
        let err = registry.register("broken", &ResourceHandle::file(&path)).unwrap_err();
        assert!(matches!(err, BackendError::Json(_)));
        assert!(!err.is_fatal());
        assert!(registry.is_empty());
    }
}
