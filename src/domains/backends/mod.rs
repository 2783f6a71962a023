//! Backends domain module.
//!
//! Backend registries store what the resource kinds register. They are
//! injected into the kinds as trait objects so the host application (or a
//! test) can supply its own.
//!
//! ## Architecture
//!
//! - `memory.rs` - `InMemoryRegistry`, identifier -> handle with a content cache
//! - `json.rs` - `JsonRegistry`, parses JSON documents on registration
//! - `messages.rs` - `MessageStore` and `.properties` parsing

mod error;
mod json;
mod memory;
mod messages;

use std::sync::Arc;

pub use error::BackendError;
pub use json::JsonRegistry;
pub use memory::{InMemoryRegistry, RegistryEntry};
pub use messages::{MessageRegistry, MessageStore, Properties, parse_properties};

use crate::domains::location::ResourceHandle;

/// A registry receiving the resources of one or more kinds.
///
/// Implementations guard their own state: lookups may happen concurrently
/// once registration is over.
pub trait BackendRegistry: Send + Sync {
    /// Registry name used in logs.
    fn name(&self) -> &str;

    /// Register a resource. Registering an existing identifier replaces it.
    fn register(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError>;

    /// Unregister a resource. Unknown identifiers are ignored.
    fn unregister(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError>;

    /// Whether `identifier` is registered.
    fn contains(&self, identifier: &str) -> bool;

    /// Number of registered resources.
    fn len(&self) -> usize;

    /// Whether nothing is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration.
    fn clear(&self);

    /// Preload registered contents; returns how many were loaded.
    fn warm_up(&self) -> usize {
        0
    }
}

/// The set of backend registries the built-in kinds register into.
///
/// Scripts and daemon scripts share the script registry.
#[derive(Clone)]
pub struct Backends {
    pub sql_queries: Arc<dyn BackendRegistry>,
    pub sql_statements: Arc<dyn BackendRegistry>,
    pub query_mappings: Arc<dyn BackendRegistry>,
    pub scripts: Arc<dyn BackendRegistry>,
    pub reports: Arc<dyn BackendRegistry>,
    pub datasets: Arc<dyn BackendRegistry>,
    pub links: Arc<dyn BackendRegistry>,
    pub bindings: Arc<dyn BackendRegistry>,
    pub messages: Arc<dyn MessageStore>,
}

impl Backends {
    /// Default in-memory registries.
    pub fn in_memory() -> Self {
        Self {
            sql_queries: Arc::new(InMemoryRegistry::new("sql-queries")),
            sql_statements: Arc::new(InMemoryRegistry::new("sql-statements")),
            query_mappings: Arc::new(InMemoryRegistry::new("query-database-mappings")),
            scripts: Arc::new(InMemoryRegistry::new("scripts")),
            reports: Arc::new(InMemoryRegistry::new("reports")),
            datasets: Arc::new(JsonRegistry::new("dataset-catalog")),
            links: Arc::new(JsonRegistry::new("links")),
            bindings: Arc::new(JsonRegistry::new("bindings")),
            messages: Arc::new(MessageRegistry::new()),
        }
    }

    /// Every distinct backend registry.
    pub fn registries(&self) -> Vec<Arc<dyn BackendRegistry>> {
        vec![
            self.sql_queries.clone(),
            self.sql_statements.clone(),
            self.query_mappings.clone(),
            self.scripts.clone(),
            self.reports.clone(),
            self.datasets.clone(),
            self.links.clone(),
            self.bindings.clone(),
        ]
    }

    /// Preload every registry's contents; returns how many were loaded.
    pub fn warm_up(&self) -> usize {
        self.registries().iter().map(|registry| registry.warm_up()).sum()
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Backends");
        for registry in self.registries() {
            dbg.field(registry.name(), &registry.len());
        }
        dbg.field("messages", &self.messages.bundle_count()).finish()
    }
}
