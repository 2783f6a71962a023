//! In-memory backend registry.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use super::{BackendError, BackendRegistry};
use crate::domains::location::ResourceHandle;

/// A registered resource.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Where the resource lives.
    pub handle: ResourceHandle,

    /// When it was registered.
    pub registered_at: DateTime<Utc>,

    /// Cached contents, filled on first read or by warm-up.
    pub contents: Option<Arc<[u8]>>,
}

/// Thread-safe registry mapping identifiers to resource handles.
///
/// Used for SQL queries, statements, mappings, scripts and report templates.
/// Contents are read lazily and cached.
#[derive(Debug)]
pub struct InMemoryRegistry {
    name: &'static str,
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the handle registered under `identifier`.
    pub fn handle(&self, identifier: &str) -> Option<ResourceHandle> {
        self.read().get(identifier).map(|entry| entry.handle.clone())
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Contents of the resource registered under `identifier`.
    pub fn contents(&self, identifier: &str) -> Result<Option<Arc<[u8]>>, BackendError> {
        let handle = {
            let entries = self.read();
            match entries.get(identifier) {
                None => return Ok(None),
                Some(RegistryEntry {
                    contents: Some(cached),
                    ..
                }) => return Ok(Some(cached.clone())),
                Some(entry) => entry.handle.clone(),
            }
        };

        let bytes: Arc<[u8]> = handle.read()?.into();
        if let Some(entry) = self.write().get_mut(identifier) {
            if entry.handle == handle {
                entry.contents = Some(bytes.clone());
            }
        }
        Ok(Some(bytes))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegistryEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegistryEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BackendRegistry for InMemoryRegistry {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        let previous = self.write().insert(
            identifier.to_string(),
            RegistryEntry {
                handle: handle.clone(),
                registered_at: Utc::now(),
                contents: None,
            },
        );
        if let Some(previous) = previous {
            debug!(
                "{}: {} re-registered, {} replaced by {}",
                self.name, identifier, previous.handle, handle
            );
        }
        Ok(())
    }

    fn unregister(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        let mut entries = self.write();
        match entries.get(identifier) {
            Some(entry) if entry.handle == *handle => {
                entries.remove(identifier);
            }
            Some(entry) => debug!(
                "{}: {} is now served by {}, not unregistering {}",
                self.name, identifier, entry.handle, handle
            ),
            None => {}
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

    fn warm_up(&self) -> usize {
        let mut loaded = 0;
        for identifier in self.identifiers() {
            match self.contents(&identifier) {
                Ok(Some(_)) => loaded += 1,
                Ok(None) => {}
                Err(e) => warn!("{}: cannot preload {}: {}", self.name, identifier, e),
            }
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_register_overwrites() {
        let registry = InMemoryRegistry::new("sql");
        let first = ResourceHandle::file("/a/A.sql");
        let second = ResourceHandle::file("/b/A.sql");

        registry.register("A", &first).unwrap();
        registry.register("A", &second).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.handle("A"), Some(second));
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let registry = InMemoryRegistry::new("sql");
        registry
            .unregister("missing", &ResourceHandle::file("/a/missing.sql"))
            .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_stale_handle_keeps_newer_entry() {
        let registry = InMemoryRegistry::new("sql");
        let first = ResourceHandle::file("/a/A.sql");
        let second = ResourceHandle::file("/b/A.sql");
        registry.register("A", &first).unwrap();
        registry.register("A", &second).unwrap();

        registry.unregister("A", &first).unwrap();
        assert!(registry.contains("A"));

        registry.unregister("A", &second).unwrap();
        assert!(!registry.contains("A"));
    }

    #[test]
    fn test_warm_up_caches_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.jrxml");
        fs::write(&path, "<jasperReport/>").unwrap();

        let registry = InMemoryRegistry::new("reports");
        registry.register("report", &ResourceHandle::file(&path)).unwrap();
        assert_eq!(registry.warm_up(), 1);

        // Served from cache once the file is gone.
        fs::remove_file(&path).unwrap();
        let contents = registry.contents("report").unwrap().unwrap();
        assert_eq!(&*contents, b"<jasperReport/>");
    }
}
