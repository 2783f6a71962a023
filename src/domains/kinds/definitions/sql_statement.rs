//! SQL statement block files.
//!
//! Statement blocks live in sub-folders of `sqlstm/`; the sub-folders are
//! part of the registry key so `sqlstm/CUSTOMER/lookup.sql` and
//! `sqlstm/ORDERS/lookup.sql` register as `CUSTOMER/LOOKUP` and
//! `ORDERS/LOOKUP`.

use std::sync::Arc;

use super::ResourceKind;
use crate::domains::backends::{BackendError, BackendRegistry};
use crate::domains::kinds::descriptor::ResourceKindDescriptor;
use crate::domains::location::ResourceHandle;

/// SQL statement block files.
pub struct SqlStatementKind {
    registry: Arc<dyn BackendRegistry>,
}

impl SqlStatementKind {
    /// Directory the identifier prefix is measured from.
    pub const ANCHOR: &'static str = "sqlstm";

    /// Kind descriptor.
    pub const DESCRIPTOR: ResourceKindDescriptor =
        ResourceKindDescriptor::new("sqlstm", "SQL Statements files", "/sqlstm/**/*.sql")
            .with_path_prefix(Self::ANCHOR);

    /// Create the kind, registering into `registry`.
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceKind for SqlStatementKind {
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
