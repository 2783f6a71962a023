//! Kind Registry - central list of the built-in resource kinds.
//!
//! When adding a new kind:
//! 1. Create the kind file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add it to `default_kinds()`

use super::definitions::{
    BindingKind, DaemonScriptKind, DatasetCatalogKind, GroovyScriptKind, LinkKind,
    MessageBundleKind, QueryMappingKind, ReportTemplateKind, ResourceKind, SqlQueryKind,
    SqlStatementKind,
};
use crate::domains::backends::Backends;

/// The built-in kinds, in registration order.
pub fn default_kinds(backends: &Backends) -> Vec<Box<dyn ResourceKind>> {
    vec![
        Box::new(GroovyScriptKind::new(backends.scripts.clone())),
        Box::new(SqlQueryKind::new(backends.sql_queries.clone())),
        Box::new(SqlStatementKind::new(backends.sql_statements.clone())),
        Box::new(DaemonScriptKind::new(backends.scripts.clone())),
        Box::new(QueryMappingKind::new(backends.query_mappings.clone())),
        Box::new(ReportTemplateKind::new(backends.reports.clone())),
        Box::new(DatasetCatalogKind::new(backends.datasets.clone())),
        Box::new(LinkKind::new(backends.links.clone())),
        Box::new(MessageBundleKind::new(backends.messages.clone())),
        Box::new(BindingKind::new(backends.bindings.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_kinds_order() {
        let kinds = default_kinds(&Backends::in_memory());
        let types: Vec<_> = kinds.iter().map(|k| k.descriptor().kind_type).collect();
        assert_eq!(
            types,
            vec![
                "scripts",
                "sql",
                "sqlstm",
                "daemons",
                "databaseMapping",
                "templates",
                "catalog",
                "lnk",
                "msgFileLib",
                "bindings"
            ]
        );
    }

    #[test]
    fn test_kind_types_unique() {
        let kinds = default_kinds(&Backends::in_memory());
        let types: Vec<_> = kinds.iter().map(|k| k.descriptor().kind_type).collect();
        let unique: HashSet<_> = types.iter().collect();
        assert_eq!(unique.len(), types.len());
    }
}
