//! Configuration management for the registrar.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables, an optional YAML configuration file and `-D`
//! command-line arguments.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::error::{Error, Result};

/// Prefix of command-line property arguments (`-Dkey=value`).
pub const PROPERTY_ARG_PREFIX: &str = "-D";

/// Configuration key enabling cache warm-up.
pub const WARMUP_KEY: &str = "context.warmup.enabled";

/// Directory next to the executable used as the default packaged root.
const DEFAULT_PACKAGED_DIR: &str = "resources";

/// Main configuration structure for the registrar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Process identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Where resources are looked for.
    pub resources: ResourcesConfig,

    /// Cache warm-up after registration.
    pub warmup: WarmupConfig,
}

/// Process identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name reported in logs.
    pub name: String,

    /// The version of the registrar.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration of the location tiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Directory `file:.` patterns are resolved against.
    pub working_dir: PathBuf,

    /// Packaged namespace roots (directories or `.zip`/`.jar` archives), in
    /// search order.
    pub packaged_roots: Vec<PathBuf>,

    /// YAML file the generic configuration map was read from.
    pub config_file: Option<PathBuf>,

    /// Process-level overrides, from `-Dkey=value` arguments.
    pub overrides: HashMap<String, String>,

    /// Generic configuration map, as flattened dotted keys.
    pub configuration: HashMap<String, String>,
}

/// Cache warm-up configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarmupConfig {
    /// Preload registered contents after startup.
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "resource-registrar".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            resources: ResourcesConfig {
                working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
                packaged_roots: default_packaged_roots(),
                ..ResourcesConfig::default()
            },
            warmup: WarmupConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `REGISTRAR_`. For example:
    /// `REGISTRAR_NAME`, `REGISTRAR_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("REGISTRAR_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("REGISTRAR_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(dir) = std::env::var("REGISTRAR_WORKING_DIR") {
            config.resources.working_dir = PathBuf::from(dir);
        }

        if let Some(paths) = std::env::var_os("REGISTRAR_PACKAGED_PATH") {
            config.resources.packaged_roots = std::env::split_paths(&paths).collect();
            info!("Packaged roots: {:?}", config.resources.packaged_roots);
        }

        if let Ok(file) = std::env::var("REGISTRAR_CONFIG_FILE") {
            let file = PathBuf::from(file);
            match load_configuration_file(&file) {
                Ok(map) => {
                    info!("Loaded {} configuration properties from {}", map.len(), file.display());
                    config.resources.configuration = map;
                    config.resources.config_file = Some(file);
                }
                Err(e) => warn!("Ignoring configuration file {}: {}", file.display(), e),
            }
        }

        if let Ok(enabled) = std::env::var("REGISTRAR_WARMUP_ENABLED") {
            config.warmup.enabled = enabled.parse().unwrap_or(false);
        }

        config.apply_warmup_property();
        config
    }

    /// Fold `-Dkey=value` arguments into the overrides.
    ///
    /// Other arguments are ignored. `-Dkey` without a value sets an empty
    /// value.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            if let Some((key, value)) = parse_property_arg(arg.as_ref()) {
                self.resources.overrides.insert(key.to_string(), value.to_string());
            }
        }
        self.apply_warmup_property();
        self
    }

    fn apply_warmup_property(&mut self) {
        let enabled = self
            .resources
            .overrides
            .get(WARMUP_KEY)
            .or_else(|| self.resources.configuration.get(WARMUP_KEY));
        if let Some(value) = enabled {
            self.warmup.enabled = value.trim().eq_ignore_ascii_case("true");
        }
    }
}

/// Split a `-Dkey=value` argument.
pub fn parse_property_arg(arg: &str) -> Option<(&str, &str)> {
    let property = arg.strip_prefix(PROPERTY_ARG_PREFIX)?;
    let (key, value) = property.split_once('=').unwrap_or((property, ""));
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Read a YAML file as a flat map of dotted keys.
pub fn load_configuration_file(path: &Path) -> Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&text)?;
    match value {
        Value::Mapping(_) | Value::Null => Ok(flatten_yaml(&value)),
        _ => Err(Error::config(format!("{} is not a YAML mapping", path.display()))),
    }
}

/// Flatten nested YAML mappings into dotted keys.
///
/// `configuration: { sql: /data/sql }` becomes `configuration.sql`. Sequence
/// items are keyed by index; nulls are dropped.
pub fn flatten_yaml(value: &Value) -> HashMap<String, String> {
    let mut flat = HashMap::new();
    flatten_into(&mut flat, String::new(), value);
    flat
}

fn flatten_into(flat: &mut HashMap<String, String>, prefix: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            flat.insert(prefix, b.to_string());
        }
        Value::Number(n) => {
            flat.insert(prefix, n.to_string());
        }
        Value::String(s) => {
            flat.insert(prefix, s.clone());
        }
        Value::Sequence(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(flat, child_key(&prefix, &idx.to_string()), item);
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    _ => continue,
                };
                flatten_into(flat, child_key(&prefix, &key), item);
            }
        }
        Value::Tagged(tagged) => flatten_into(flat, prefix, &tagged.value),
    }
}

fn child_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn default_packaged_roots() -> Vec<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_PACKAGED_DIR)))
        .filter(|dir| dir.is_dir())
        .into_iter()
        .collect()
}
