//! Tiered location resolution.
//!
//! Resources of a kind are searched successively in:
//! 1. the process-level override `configuration.<type>`
//! 2. the same key in the generic configuration map
//! 3. the kind's path template under the working directory
//! 4. the kind's path template in the packaged namespace
//!
//! The first tier producing at least one match wins. Tier failures are never
//! fatal; they only mean the next tier is tried.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::LocationError;
use super::handle::ResourceHandle;
use super::namespace::{Matches, PackagedNamespace, scan_directory};
use super::pattern::{CLASSPATH_PREFIX, FILE_PREFIX, GlobPattern, LocationPattern, rework_path};
use crate::core::config::ResourcesConfig;
use crate::domains::kinds::ResourceKindDescriptor;

/// Discovery source that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Process-level override (`-Dconfiguration.<type>=...`).
    Override,
    /// Generic configuration map.
    Configuration,
    /// Path template under the working directory.
    WorkingDirectory,
    /// Path template in the packaged namespace.
    Packaged,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Override => "override",
            Tier::Configuration => "configuration",
            Tier::WorkingDirectory => "working directory",
            Tier::Packaged => "packaged namespace",
        };
        f.write_str(name)
    }
}

/// Result of resolving one kind.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Tier that produced the handles, `None` when nothing was found.
    pub tier: Option<Tier>,

    /// Logical path of the directory the winning tier expanded its glob from.
    pub base: Option<String>,

    /// Located resources, without duplicates.
    pub handles: Vec<ResourceHandle>,
}

impl Resolution {
    fn found(tier: Tier, matches: Matches) -> Self {
        Self {
            tier: Some(tier),
            base: Some(matches.base),
            handles: matches.handles,
        }
    }

    /// Whether no tier produced a match.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Locates the files of resource kinds.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    overrides: HashMap<String, String>,
    configuration: HashMap<String, String>,
    working_dir: PathBuf,
    namespace: PackagedNamespace,
}

impl LocationResolver {
    /// Create a resolver rooted at `working_dir` with no overrides, no
    /// configuration and an empty packaged namespace.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            overrides: HashMap::new(),
            configuration: HashMap::new(),
            working_dir: working_dir.into(),
            namespace: PackagedNamespace::default(),
        }
    }

    /// Create a resolver from the resources configuration.
    pub fn from_config(config: &ResourcesConfig) -> Self {
        Self {
            overrides: config.overrides.clone(),
            configuration: config.configuration.clone(),
            working_dir: config.working_dir.clone(),
            namespace: PackagedNamespace::from_paths(config.packaged_roots.iter().cloned()),
        }
    }

    /// Set a process-level override.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Set a generic configuration value.
    pub fn with_configuration(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    /// Replace the packaged namespace.
    pub fn with_namespace(mut self, namespace: PackagedNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// The working directory relative patterns are resolved against.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The packaged namespace.
    pub fn namespace(&self) -> &PackagedNamespace {
        &self.namespace
    }

    /// Find the resources of a kind, tier by tier.
    pub fn resolve(&self, descriptor: &ResourceKindDescriptor) -> Resolution {
        let key = descriptor.settings_key();
        let description = descriptor.description;

        if let Some(path) = self.overrides.get(&key) {
            info!("The parameter \"-D{key}\" is set to {path}. Looking for {description} ...");
            let found = self.try_pattern(&rework_path(path, descriptor.path_template));
            if !found.is_empty() {
                return Resolution::found(Tier::Override, found);
            }
        } else {
            info!("The parameter \"-D{key}\" is not set.");
        }

        if let Some(path) = self.configuration.get(&key) {
            info!("The configuration property \"{key}\" is set to {path}. Looking for {description} ...");
            let found = self.try_pattern(&rework_path(path, descriptor.path_template));
            if !found.is_empty() {
                return Resolution::found(Tier::Configuration, found);
            }
        } else {
            info!("The configuration property \"{key}\" is not set.");
        }

        info!("Looking for {key} in the working directory...");
        let local = LocationPattern::parse(&format!("{FILE_PREFIX}.{}", descriptor.path_template));
        let found = self.try_pattern(&local);
        if !found.is_empty() {
            return Resolution::found(Tier::WorkingDirectory, found);
        }

        info!("Looking for {key} in the packaged resources...");
        let packaged = LocationPattern::parse(&format!("{CLASSPATH_PREFIX}{}", descriptor.path_template));
        let found = self.try_pattern(&packaged);
        if !found.is_empty() {
            return Resolution::found(Tier::Packaged, found);
        }

        Resolution::default()
    }

    /// Resolve a single location pattern against its namespace.
    ///
    /// Handles reaching the same physical file are collapsed to the first one.
    pub fn resolve_pattern(&self, pattern: &LocationPattern) -> Result<Matches, LocationError> {
        let mut found = match pattern {
            LocationPattern::File(glob) => {
                scan_directory(&self.working_dir, &GlobPattern::compile(glob)?)?
            }
            LocationPattern::Packaged(glob) => self.namespace.resolve(glob)?,
        };
        found.handles = dedup(found.handles);
        Ok(found)
    }

    fn try_pattern(&self, pattern: &LocationPattern) -> Matches {
        match self.resolve_pattern(pattern) {
            Ok(found) => found,
            Err(e) => {
                debug!("No resource found in {pattern}: {e}");
                Matches::default()
            }
        }
    }
}

fn dedup(handles: Vec<ResourceHandle>) -> Vec<ResourceHandle> {
    let mut seen = HashSet::new();
    handles
        .into_iter()
        .filter(|handle| seen.insert(handle.physical_key()))
        .collect()
}
