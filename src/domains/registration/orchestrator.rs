//! Resource registration orchestrator.
//!
//! Owns the resource kinds in a fixed order. At startup every kind is
//! located and registered; at shutdown everything recorded is unregistered.
//! Per-file failures are logged and skipped; only a backend's fatal error
//! stops a registration pass.

use serde::Serialize;
use tracing::{error, info, warn};

use super::error::RegistrationError;
use super::table::{LocatedResource, RegistrationTable};
use crate::domains::backends::Backends;
use crate::domains::kinds::{ResourceKind, ResourceKindDescriptor, default_kinds, derive_identifier};
use crate::domains::location::{LocationResolver, Resolution, Tier};

/// Outcome of registering one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindReport {
    pub kind_type: &'static str,
    pub tier: Option<Tier>,
    pub located: usize,
    pub registered: usize,
    pub skipped: usize,
    /// The kind's setup already loaded its resources; nothing was registered
    /// file by file.
    pub loaded_by_setup: bool,
}

impl KindReport {
    fn new(descriptor: &ResourceKindDescriptor) -> Self {
        Self {
            kind_type: descriptor.kind_type,
            tier: None,
            located: 0,
            registered: 0,
            skipped: 0,
            loaded_by_setup: false,
        }
    }
}

/// Outcome of [`ResourceRegistrationOrchestrator::register_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    pub kinds: Vec<KindReport>,
}

impl RegistrationReport {
    /// Resources registered across all kinds.
    pub fn registered(&self) -> usize {
        self.kinds.iter().map(|k| k.registered).sum()
    }

    /// Resources skipped across all kinds.
    pub fn skipped(&self) -> usize {
        self.kinds.iter().map(|k| k.skipped).sum()
    }

    /// Report of one kind.
    pub fn kind(&self, kind_type: &str) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind_type == kind_type)
    }
}

/// Outcome of unregistering one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindTeardown {
    pub kind_type: &'static str,
    pub unregistered: usize,
    pub failed: usize,
}

/// Outcome of [`ResourceRegistrationOrchestrator::unregister_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnregistrationReport {
    pub kinds: Vec<KindTeardown>,
}

impl UnregistrationReport {
    /// Resources unregistered across all kinds.
    pub fn unregistered(&self) -> usize {
        self.kinds.iter().map(|k| k.unregistered).sum()
    }

    /// Resources whose unregistration failed.
    pub fn failed(&self) -> usize {
        self.kinds.iter().map(|k| k.failed).sum()
    }
}

struct KindSlot {
    kind: Box<dyn ResourceKind>,
    table: RegistrationTable,
}

/// Drives discovery, registration and teardown of every resource kind.
pub struct ResourceRegistrationOrchestrator {
    resolver: LocationResolver,
    slots: Vec<KindSlot>,
}

impl ResourceRegistrationOrchestrator {
    /// Create an orchestrator without kinds.
    pub fn new(resolver: LocationResolver) -> Self {
        Self {
            resolver,
            slots: Vec::new(),
        }
    }

    /// Create an orchestrator with the built-in kinds registering into `backends`.
    pub fn with_default_kinds(resolver: LocationResolver, backends: &Backends) -> Self {
        let slots = default_kinds(backends)
            .into_iter()
            .map(|kind| KindSlot {
                kind,
                table: RegistrationTable::new(),
            })
            .collect();
        Self { resolver, slots }
    }

    /// Append a kind. Its type key must not already be present.
    pub fn add_kind(&mut self, kind: Box<dyn ResourceKind>) -> Result<(), RegistrationError> {
        let kind_type = kind.descriptor().kind_type;
        if self.slot(kind_type).is_some() {
            return Err(RegistrationError::DuplicateKind(kind_type.to_string()));
        }
        self.slots.push(KindSlot {
            kind,
            table: RegistrationTable::new(),
        });
        Ok(())
    }

    /// Descriptors of the owned kinds, in registration order.
    pub fn descriptors(&self) -> Vec<ResourceKindDescriptor> {
        self.slots.iter().map(|slot| *slot.kind.descriptor()).collect()
    }

    /// What a kind currently has registered.
    pub fn table(&self, kind_type: &str) -> Option<&RegistrationTable> {
        self.slot(kind_type).map(|slot| &slot.table)
    }

    /// Locate and register every kind's resources.
    ///
    /// Stops at the first fatal backend error; what was registered before it
    /// stays recorded so [`unregister_all`](Self::unregister_all) can undo it.
    pub fn register_all(&mut self) -> Result<RegistrationReport, RegistrationError> {
        let mut report = RegistrationReport::default();
        for slot in self.slots.iter_mut() {
            report.kinds.push(register_kind(&self.resolver, slot)?);
        }
        info!(
            "Resource registration done: {} registered, {} skipped",
            report.registered(),
            report.skipped()
        );
        Ok(report)
    }

    /// Unregister everything recorded by previous registration passes.
    pub fn unregister_all(&mut self) -> UnregistrationReport {
        let mut report = UnregistrationReport::default();
        for slot in self.slots.iter_mut() {
            report.kinds.push(unregister_kind(slot));
        }
        info!(
            "Resource unregistration done: {} unregistered, {} failed",
            report.unregistered(),
            report.failed()
        );
        report
    }

    fn slot(&self, kind_type: &str) -> Option<&KindSlot> {
        self.slots
            .iter()
            .find(|slot| slot.kind.descriptor().kind_type == kind_type)
    }
}

/// Derive identifiers for every resolved handle; returns the located
/// resources and how many handles were skipped.
fn locate(descriptor: &ResourceKindDescriptor, resolution: &Resolution) -> (Vec<LocatedResource>, usize) {
    let mut skipped = 0;
    let mut located = Vec::with_capacity(resolution.handles.len());
    for handle in &resolution.handles {
        match derive_identifier(handle, resolution.base.as_deref(), descriptor) {
            Ok(identifier) => located.push(LocatedResource {
                identifier,
                handle: handle.clone(),
            }),
            Err(e) => {
                warn!("{} skipped: {}", handle, e);
                skipped += 1;
            }
        }
    }
    (located, skipped)
}

fn register_kind(resolver: &LocationResolver, slot: &mut KindSlot) -> Result<KindReport, RegistrationError> {
    let descriptor = *slot.kind.descriptor();
    let mut report = KindReport::new(&descriptor);

    if let Err(e) = slot.kind.prepare(resolver) {
        if e.is_fatal() {
            return Err(RegistrationError::fatal(descriptor.kind_type, "setup", e));
        }
        error!("Setup of {} failed: {}", descriptor.description, e);
    }
    if slot.kind.loaded_by_setup() {
        info!("{} already loaded during setup.", descriptor.description);
        report.loaded_by_setup = true;
        return Ok(report);
    }

    let resolution = resolver.resolve(&descriptor);
    if resolution.is_empty() {
        info!("No {} detected.", descriptor.description);
        return Ok(report);
    }
    report.tier = resolution.tier;
    report.located = resolution.handles.len();

    let (located, skipped) = locate(&descriptor, &resolution);
    report.skipped = skipped;

    for resource in located {
        let LocatedResource { identifier, handle } = resource;
        if let Err(e) = handle.verify() {
            error!("The file resource {handle} cannot be resolved. {identifier} registration failed: {e}");
            report.skipped += 1;
            continue;
        }
        match slot.kind.register_backend(&identifier, &handle) {
            Ok(()) => {
                slot.table.record(identifier, handle);
                report.registered += 1;
            }
            Err(e) if e.is_fatal() => {
                return Err(RegistrationError::fatal(descriptor.kind_type, handle.to_string(), e));
            }
            Err(e) => {
                error!("Registration of {identifier} ({handle}) failed: {e}");
                report.skipped += 1;
            }
        }
    }

    info!(
        "{} {} registered from the {}",
        report.registered,
        descriptor.description,
        report.tier.map_or_else(|| "-".to_string(), |t| t.to_string())
    );
    Ok(report)
}

fn unregister_kind(slot: &mut KindSlot) -> KindTeardown {
    let descriptor = *slot.kind.descriptor();
    let mut teardown = KindTeardown {
        kind_type: descriptor.kind_type,
        unregistered: 0,
        failed: 0,
    };

    for (identifier, handle) in slot.table.drain_sorted() {
        if let Err(e) = handle.check_origin() {
            warn!("The file resource {handle} cannot be resolved. {identifier} unregistration failed: {e}");
            teardown.failed += 1;
            continue;
        }
        match slot.kind.unregister_backend(&identifier, &handle) {
            Ok(()) => teardown.unregistered += 1,
            Err(e) => {
                warn!("Unregistration of {identifier} ({handle}) failed: {e}");
                teardown.failed += 1;
            }
        }
    }
    slot.kind.teardown();
    teardown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::{BackendError, BackendRegistry, InMemoryRegistry};
    use crate::domains::location::{PackagedNamespace, ResourceHandle};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn touch(root: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[cfg(feature = "archive")]
    fn write_jar(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        use std::io::Write;

        let path = dir.join(name);
        let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        for (entry, contents) in entries {
            writer
                .start_file(*entry, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    /// Registers into an in-memory registry, failing on chosen identifiers.
    struct ScriptedKind {
        descriptor: ResourceKindDescriptor,
        registry: Arc<InMemoryRegistry>,
        reject: Option<&'static str>,
        fatal: Option<&'static str>,
        torn_down: Arc<AtomicBool>,
        unregistered: Arc<Mutex<Vec<(String, ResourceHandle)>>>,
    }

    impl ScriptedKind {
        fn new(descriptor: ResourceKindDescriptor, registry: Arc<InMemoryRegistry>) -> Self {
            Self {
                descriptor,
                registry,
                reject: None,
                fatal: None,
                torn_down: Arc::new(AtomicBool::new(false)),
                unregistered: Arc::default(),
            }
        }
    }

    impl ResourceKind for ScriptedKind {
        fn descriptor(&self) -> &ResourceKindDescriptor {
            &self.descriptor
        }

        fn register_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
            if self.fatal == Some(identifier) {
                return Err(BackendError::fatal("no datasource configured"));
            }
            if self.reject == Some(identifier) {
                return Err(BackendError::rejected("unsupported dialect"));
            }
            self.registry.register(identifier, handle)
        }

        fn unregister_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
            self.unregistered
                .lock()
                .unwrap()
                .push((identifier.to_string(), handle.clone()));
            self.registry.unregister(identifier, handle)
        }

        fn teardown(&mut self) {
            self.torn_down.store(true, Ordering::SeqCst);
        }
    }

    const SQL: ResourceKindDescriptor = ResourceKindDescriptor::new("sql", "SQL Queries files", "/sql/**/*.sql");
    const LNK: ResourceKindDescriptor = ResourceKindDescriptor::new("lnk", "lnk files", "/lnk/*.json");

    #[test]
    fn test_default_kinds_round_trip() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/customer.sql", "select 1");
        touch(work.path(), "scripts/job.groovy", "println 'hi'");
        touch(work.path(), "sqlstm/customer/lookup.sql", "select 2");
        touch(work.path(), "catalog/sales.v1.json", r#"{"name": "sales"}"#);
        touch(work.path(), "catalog/broken.json", "{ not json");

        let backends = Backends::in_memory();
        let mut orchestrator =
            ResourceRegistrationOrchestrator::with_default_kinds(LocationResolver::new(work.path()), &backends);

        let report = orchestrator.register_all().unwrap();
        assert_eq!(report.kinds.len(), 10);
        assert_eq!(report.registered(), 4);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.kind("sql").unwrap().tier, Some(Tier::WorkingDirectory));
        assert_eq!(report.kind("daemons").unwrap().tier, None);

        assert!(backends.sql_queries.contains("customer"));
        assert!(backends.scripts.contains("job"));
        assert!(backends.sql_statements.contains("CUSTOMER/LOOKUP"));
        assert!(backends.datasets.contains("sales.v1"));
        assert!(!backends.datasets.contains("broken"));
        assert_eq!(orchestrator.table("catalog").unwrap().identifiers(), vec!["sales.v1"]);

        let teardown = orchestrator.unregister_all();
        assert_eq!(teardown.unregistered(), 4);
        assert_eq!(teardown.failed(), 0);
        assert!(backends.registries().iter().all(|r| r.is_empty()));
        assert!(orchestrator.table("sql").unwrap().is_empty());
    }

    #[test]
    fn test_identifier_collision_keeps_last_and_unregisters_it() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/x/A.sql", "first");
        let second = touch(work.path(), "sql/y/A.sql", "second");

        let registry = Arc::new(InMemoryRegistry::new("sql"));
        let mut orchestrator = ResourceRegistrationOrchestrator::new(LocationResolver::new(work.path()));
        orchestrator
            .add_kind(Box::new(ScriptedKind::new(SQL, registry.clone())))
            .unwrap();

        let report = orchestrator.register_all().unwrap();
        assert_eq!(report.kind("sql").unwrap().located, 2);
        assert_eq!(report.kind("sql").unwrap().registered, 2);
        assert_eq!(registry.handle("A"), Some(ResourceHandle::file(&second)));
        assert_eq!(orchestrator.table("sql").unwrap().len(), 1);

        let teardown = orchestrator.unregister_all();
        assert_eq!(teardown.unregistered(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_second_pass_overwrites_and_teardown_unregisters_last_handle() {
        let work = tempfile::tempdir().unwrap();
        let first = touch(work.path(), "sql/one/A.sql", "first");

        let registry = Arc::new(InMemoryRegistry::new("sql"));
        let kind = ScriptedKind::new(SQL, registry.clone());
        let unregistered = kind.unregistered.clone();
        let mut orchestrator = ResourceRegistrationOrchestrator::new(LocationResolver::new(work.path()));
        orchestrator.add_kind(Box::new(kind)).unwrap();

        orchestrator.register_all().unwrap();
        assert_eq!(registry.handle("A"), Some(ResourceHandle::file(&first)));

        fs::remove_file(&first).unwrap();
        let second = touch(work.path(), "sql/two/A.sql", "second");
        orchestrator.register_all().unwrap();

        assert_eq!(registry.handle("A"), Some(ResourceHandle::file(&second)));
        assert_eq!(orchestrator.table("sql").unwrap().get("A"), Some(&ResourceHandle::file(&second)));

        let teardown = orchestrator.unregister_all();
        assert_eq!(teardown.unregistered(), 1);
        assert_eq!(
            *unregistered.lock().unwrap(),
            vec![("A".to_string(), ResourceHandle::file(&second))]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_deleted_file_is_still_unregistered() {
        let work = tempfile::tempdir().unwrap();
        let gone = touch(work.path(), "sql/gone.sql", "select 1");
        touch(work.path(), "sql/kept.sql", "select 2");

        let registry = Arc::new(InMemoryRegistry::new("sql"));
        let kind = ScriptedKind::new(SQL, registry.clone());
        let torn_down = kind.torn_down.clone();
        let mut orchestrator = ResourceRegistrationOrchestrator::new(LocationResolver::new(work.path()));
        orchestrator.add_kind(Box::new(kind)).unwrap();
        orchestrator.register_all().unwrap();

        fs::remove_file(gone).unwrap();
        let teardown = orchestrator.unregister_all();

        assert_eq!(teardown.unregistered(), 2);
        assert_eq!(teardown.failed(), 0);
        assert!(registry.is_empty());
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_vanished_archive_is_skipped_on_unregister() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_jar(dir.path(), "app.jar", &[("sql/customer.sql", "select 1")]);

        let registry = Arc::new(InMemoryRegistry::new("sql"));
        let resolver = LocationResolver::new(dir.path().join("work"))
            .with_namespace(PackagedNamespace::from_paths([&archive]));
        let mut orchestrator = ResourceRegistrationOrchestrator::new(resolver);
        orchestrator.add_kind(Box::new(ScriptedKind::new(SQL, registry.clone()))).unwrap();
        orchestrator.register_all().unwrap();
        assert!(registry.contains("customer"));

        fs::remove_file(&archive).unwrap();
        let teardown = orchestrator.unregister_all();
        assert_eq!(teardown.failed(), 1);
        assert!(orchestrator.table("sql").unwrap().is_empty());
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_statement_keys_from_archive_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_jar(
            dir.path(),
            "app.jar",
            &[
                ("sqlstm/CUSTOMER/lookup.sql", "select 1"),
                ("sqlstm/batch/daily/close.sql", "select 2"),
                ("sqlstm/top.sql", "select 3"),
            ],
        );

        let backends = Backends::in_memory();
        let resolver = LocationResolver::new(dir.path().join("work"))
            .with_namespace(PackagedNamespace::from_paths([&archive]));
        let mut orchestrator = ResourceRegistrationOrchestrator::with_default_kinds(resolver, &backends);

        let report = orchestrator.register_all().unwrap();
        assert_eq!(report.kind("sqlstm").unwrap().tier, Some(Tier::Packaged));
        assert_eq!(
            orchestrator.table("sqlstm").unwrap().identifiers(),
            vec!["BATCH/DAILY/CLOSE", "CUSTOMER/LOOKUP", "TOP"]
        );
        assert!(backends.sql_statements.contains("CUSTOMER/LOOKUP"));

        orchestrator.unregister_all();
        assert!(backends.sql_statements.is_empty());
    }

    #[test]
    fn test_statement_keys_ignore_anchor_above_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("sqlstm").join("app");
        touch(&work, "sqlstm/CUSTOMER/lookup.sql", "select 1");

        let backends = Backends::in_memory();
        let mut orchestrator =
            ResourceRegistrationOrchestrator::with_default_kinds(LocationResolver::new(&work), &backends);
        orchestrator.register_all().unwrap();

        assert_eq!(orchestrator.table("sqlstm").unwrap().identifiers(), vec!["CUSTOMER/LOOKUP"]);
    }

    #[test]
    fn test_bundled_messages_are_not_registered_per_file() {
        let packaged = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        touch(packaged.path(), "messages/en/errors.properties", "E001=Invalid key");
        touch(work.path(), "config/msgFileLib/local.properties", "BYE=Bye");

        let backends = Backends::in_memory();
        let resolver = LocationResolver::new(work.path())
            .with_namespace(PackagedNamespace::from_paths([packaged.path()]));
        let mut orchestrator = ResourceRegistrationOrchestrator::with_default_kinds(resolver, &backends);

        let report = orchestrator.register_all().unwrap();
        let messages = report.kind("msgFileLib").unwrap();
        assert!(messages.loaded_by_setup);
        assert_eq!(messages.registered, 0);
        assert!(orchestrator.table("msgFileLib").unwrap().is_empty());
        assert_eq!(backends.messages.bundle_count(), 1);

        orchestrator.unregister_all();
        assert_eq!(backends.messages.bundle_count(), 0);
    }

    #[test]
    fn test_unreadable_message_file_is_skipped() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "config/msgFileLib/good.properties", "OK=fine");
        touch(work.path(), "config/msgFileLib/bad.properties", "BAD=\\u12");

        let backends = Backends::in_memory();
        let mut orchestrator =
            ResourceRegistrationOrchestrator::with_default_kinds(LocationResolver::new(work.path()), &backends);

        let report = orchestrator.register_all().unwrap();
        let messages = report.kind("msgFileLib").unwrap();
        assert_eq!(messages.registered, 1);
        assert_eq!(messages.skipped, 1);
        assert_eq!(orchestrator.table("msgFileLib").unwrap().identifiers(), vec!["good"]);
    }

    #[test]
    fn test_rejected_resource_is_skipped() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/good.sql", "select 1");
        touch(work.path(), "sql/bad.sql", "select 2");

        let registry = Arc::new(InMemoryRegistry::new("sql"));
        let mut kind = ScriptedKind::new(SQL, registry.clone());
        kind.reject = Some("bad");
        let mut orchestrator = ResourceRegistrationOrchestrator::new(LocationResolver::new(work.path()));
        orchestrator.add_kind(Box::new(kind)).unwrap();

        let report = orchestrator.register_all().unwrap();
        assert_eq!(report.registered(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(orchestrator.table("sql").unwrap().identifiers(), vec!["good"]);
    }

    #[test]
    fn test_fatal_error_aborts_and_keeps_earlier_registrations() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/first.sql", "select 1");
        touch(work.path(), "lnk/broken.json", "{}");

        let sql = Arc::new(InMemoryRegistry::new("sql"));
        let links = Arc::new(InMemoryRegistry::new("lnk"));
        let mut lnk = ScriptedKind::new(LNK, links.clone());
        lnk.fatal = Some("broken");

        let mut orchestrator = ResourceRegistrationOrchestrator::new(LocationResolver::new(work.path()));
        orchestrator.add_kind(Box::new(ScriptedKind::new(SQL, sql.clone()))).unwrap();
        orchestrator.add_kind(Box::new(lnk)).unwrap();

        let err = orchestrator.register_all().unwrap_err();
        assert!(matches!(err, RegistrationError::Fatal { ref kind, .. } if kind == "lnk"));
        assert!(sql.contains("first"));

        orchestrator.unregister_all();
        assert!(sql.is_empty());
        assert!(links.is_empty());
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let registry = Arc::new(InMemoryRegistry::new("sql"));
        let mut orchestrator = ResourceRegistrationOrchestrator::new(LocationResolver::new("."));
        orchestrator
            .add_kind(Box::new(ScriptedKind::new(SQL, registry.clone())))
            .unwrap();

        let err = orchestrator
            .add_kind(Box::new(ScriptedKind::new(SQL, registry)))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateKind(ref t) if t == "sql"));
        assert_eq!(orchestrator.descriptors().len(), 1);
    }
}
