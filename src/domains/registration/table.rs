//! Per-kind registration bookkeeping.

use std::collections::HashMap;

use crate::domains::location::ResourceHandle;

/// A located resource paired with its registry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedResource {
    pub identifier: String,
    pub handle: ResourceHandle,
}

/// Identifier -> handle map of what a kind has registered.
///
/// Recording an identifier twice keeps the latest handle.
#[derive(Debug, Clone, Default)]
pub struct RegistrationTable {
    entries: HashMap<String, ResourceHandle>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful registration, returning the handle it replaced.
    pub fn record(&mut self, identifier: String, handle: ResourceHandle) -> Option<ResourceHandle> {
        self.entries.insert(identifier, handle)
    }

    pub fn get(&self, identifier: &str) -> Option<&ResourceHandle> {
        self.entries.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Empty the table, yielding its entries sorted by identifier.
    pub fn drain_sorted(&mut self) -> Vec<(String, ResourceHandle)> {
        let mut entries: Vec<_> = self.entries.drain().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
