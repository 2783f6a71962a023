//! Startup and shutdown of resource registration.
//!
//! [`Bootstrap`] owns the orchestrator and the backend registries. `start()`
//! registers every kind and optionally warms caches; `stop()` unregisters
//! everything once. Dropping a started bootstrap stops it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::config::Config;
use super::error::{Error, Result};
use crate::domains::backends::Backends;
use crate::domains::location::LocationResolver;
use crate::domains::registration::{RegistrationReport, ResourceRegistrationOrchestrator, UnregistrationReport};

/// What `start()` did.
#[derive(Debug, Clone, Serialize)]
pub struct StartupSummary {
    pub started_at: DateTime<Utc>,
    pub registration: RegistrationReport,
    /// Entries preloaded by warm-up, when enabled.
    pub warmed_up: Option<usize>,
}

/// Registration lifecycle.
pub struct Bootstrap {
    config: Arc<Config>,
    orchestrator: ResourceRegistrationOrchestrator,
    backends: Backends,
    started_at: Option<DateTime<Utc>>,
}

impl Bootstrap {
    /// Create a bootstrap with in-memory backends and the built-in kinds.
    pub fn new(config: Config) -> Self {
        Self::with_backends(config, Backends::in_memory())
    }

    /// Create a bootstrap registering the built-in kinds into `backends`.
    pub fn with_backends(config: Config, backends: Backends) -> Self {
        let resolver = LocationResolver::from_config(&config.resources);
        let orchestrator = ResourceRegistrationOrchestrator::with_default_kinds(resolver, &backends);
        Self::with_orchestrator(config, orchestrator, backends)
    }

    /// Create a bootstrap around a prepared orchestrator.
    pub fn with_orchestrator(
        config: Config,
        orchestrator: ResourceRegistrationOrchestrator,
        backends: Backends,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
            backends,
            started_at: None,
        }
    }

    /// Get the configured name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The backend registries.
    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    pub fn orchestrator(&self) -> &ResourceRegistrationOrchestrator {
        &self.orchestrator
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// When the last successful `start()` finished.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Register every kind's resources, then warm caches when enabled.
    ///
    /// On a fatal backend error everything registered so far is unregistered
    /// before the error is returned.
    pub fn start(&mut self) -> Result<StartupSummary> {
        if self.is_started() {
            return Err(Error::internal(format!("{} is already started", self.name())));
        }
        info!("Starting resource registration for {}", self.name());

        let registration = match self.orchestrator.register_all() {
            Ok(report) => report,
            Err(e) => {
                error!("Resource registration aborted: {e}");
                self.orchestrator.unregister_all();
                return Err(e.into());
            }
        };

        let warmed_up = self.config.warmup.enabled.then(|| {
            let loaded = self.backends.warm_up();
            info!("Warm-up preloaded {loaded} resources");
            loaded
        });

        let started_at = Utc::now();
        self.started_at = Some(started_at);
        Ok(StartupSummary {
            started_at,
            registration,
            warmed_up,
        })
    }

    /// Unregister everything. Returns `None` when not started.
    pub fn stop(&mut self) -> Option<UnregistrationReport> {
        let started_at = self.started_at.take()?;
        info!("Stopping resource registration started at {}", started_at.to_rfc3339());
        Some(self.orchestrator.unregister_all())
    }
}

impl Drop for Bootstrap {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::{BackendError, BackendRegistry};
    use crate::domains::kinds::{ResourceKind, ResourceKindDescriptor};
    use crate::domains::location::ResourceHandle;
    use std::fs;
    use std::path::Path;

    fn touch(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.resources.working_dir = root.to_path_buf();
        config.resources.packaged_roots = Vec::new();
        config
    }

    /// Fails fatally on every resource.
    struct MisconfiguredKind;

    impl MisconfiguredKind {
        const DESCRIPTOR: ResourceKindDescriptor =
            ResourceKindDescriptor::new("datasource", "datasource files", "/datasource/*.properties");
    }

    impl ResourceKind for MisconfiguredKind {
        fn descriptor(&self) -> &ResourceKindDescriptor {
            &Self::DESCRIPTOR
        }

        fn register_backend(&self, _: &str, _: &ResourceHandle) -> std::result::Result<(), BackendError> {
            Err(BackendError::fatal("no connection pool"))
        }

        fn unregister_backend(&self, _: &str, _: &ResourceHandle) -> std::result::Result<(), BackendError> {
            Ok(())
        }
    }

    #[test]
    fn test_start_then_stop_restores_backends() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/customer.sql", "select 1");
        touch(work.path(), "templates/invoice.jrxml", "<jasperReport/>");

        let mut bootstrap = Bootstrap::new(config_for(work.path()));
        let summary = bootstrap.start().unwrap();

        assert!(bootstrap.is_started());
        assert_eq!(summary.registration.registered(), 2);
        assert_eq!(summary.warmed_up, None);
        assert!(bootstrap.backends().sql_queries.contains("customer"));

        let teardown = bootstrap.stop().unwrap();
        assert_eq!(teardown.unregistered(), 2);
        assert!(!bootstrap.is_started());
        assert!(bootstrap.backends().registries().iter().all(|r| r.is_empty()));
        assert!(bootstrap.stop().is_none());
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let work = tempfile::tempdir().unwrap();
        let mut bootstrap = Bootstrap::new(config_for(work.path()));
        bootstrap.start().unwrap();

        assert!(matches!(bootstrap.start(), Err(Error::Internal(_))));
    }

    #[test]
    fn test_warm_up_when_enabled() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/customer.sql", "select 1");
        touch(work.path(), "scripts/nightly.groovy", "run()");

        let mut config = config_for(work.path());
        config.warmup.enabled = true;
        let mut bootstrap = Bootstrap::new(config);

        assert_eq!(bootstrap.start().unwrap().warmed_up, Some(2));
    }

    #[test]
    fn test_fatal_error_unregisters_everything() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "sql/customer.sql", "select 1");
        touch(work.path(), "datasource/main.properties", "url=jdbc:h2:mem");

        let config = config_for(work.path());
        let backends = Backends::in_memory();
        let mut orchestrator = ResourceRegistrationOrchestrator::with_default_kinds(
            LocationResolver::from_config(&config.resources),
            &backends,
        );
        orchestrator.add_kind(Box::new(MisconfiguredKind)).unwrap();
        let mut bootstrap = Bootstrap::with_orchestrator(config, orchestrator, backends.clone());

        let err = bootstrap.start().unwrap_err();
        assert!(err.is_fatal());
        assert!(!bootstrap.is_started());
        assert!(backends.sql_queries.is_empty());
    }

    #[test]
    fn test_drop_stops_started_bootstrap() {
        let work = tempfile::tempdir().unwrap();
        touch(work.path(), "lnk/home.json", r#"{"target": "/"}"#);

        let backends = Backends::in_memory();
        {
            let mut bootstrap = Bootstrap::with_backends(config_for(work.path()), backends.clone());
            bootstrap.start().unwrap();
            assert!(backends.links.contains("home"));
        }
        assert!(backends.links.is_empty());
    }
}
