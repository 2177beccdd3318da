//! Layered configuration loader.
//!
//! Discovers configuration layers (system, user, cwd, runtime overrides),
//! validates each against the schema, merges them, applies environment
//! overrides, and produces a final `ParleyConfig`.

mod env;
mod layer_io;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, ParleyConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "parley.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".parley";

#[cfg(unix)]
/// Default system config path on Unix.
const SYSTEM_CONFIG_PATH: &str = "/etc/parley/parley.json5";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: ParleyConfig,
    /// Metadata for each layer applied, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// System-wide configuration.
    System,
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Explicit runtime config files.
    Runtime,
    /// Process environment variables (highest precedence).
    Env,
}

/// Metadata about a config layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    /// Location on disk for file layers.
    pub path: Option<PathBuf>,
    /// Environment variables applied, for the env layer.
    pub variables: Vec<String>,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory searched for a local `parley.json5`.
    pub cwd: PathBuf,
    /// Optional system config path (defaults to `/etc/parley/parley.json5` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// Optional user config path (defaults to `~/.parley/parley.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime config paths applied after discovered layers.
    pub runtime_paths: Vec<PathBuf>,
    /// Apply process environment overrides last.
    pub apply_env: bool,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_config_path(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            apply_env: true,
        }
    }

    /// Options that only consider the given cwd and explicit runtime paths.
    pub fn isolated(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: None,
            user_config_path: None,
            runtime_paths: Vec::new(),
            apply_env: false,
        }
    }

    /// Add a runtime override config path that is applied after file layers.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl ParleyConfig {
    /// Load a single config from a path (no layering, no env).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering, no env).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack reading overrides from the process env.
    ///
    /// Layer precedence (low -> high): system, user, cwd, runtime, env.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_env(options, |name| std::env::var(name).ok())
    }

    /// Load a layered config stack with an explicit environment lookup.
    pub fn load_layered_with_env<F>(
        options: LayeredConfigOptions,
        lookup: F,
    ) -> Result<LayeredConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        let discovered = [
            (
                ConfigLayerSource::System,
                options.system_config_path.clone(),
            ),
            (ConfigLayerSource::User, options.user_config_path.clone()),
            (
                ConfigLayerSource::Cwd,
                Some(options.cwd.join(DEFAULT_CONFIG_FILE)),
            ),
        ];
        for (source, path) in discovered {
            let Some(layer) = layer_io::load_optional_layer(source, path.as_deref())? else {
                continue;
            };
            if !seen_paths.insert(layer_io::unique_path(&layer.path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    layer.path.display()
                );
                continue;
            }
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta());
        }

        for runtime_path in &options.runtime_paths {
            let layer = layer_io::load_required_layer(ConfigLayerSource::Runtime, runtime_path)?;
            debug!("loaded runtime layer (path={})", runtime_path.display());
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta());
        }

        if options.apply_env {
            let applied = env::apply_env_overrides(&mut merged, lookup)?;
            if !applied.is_empty() {
                debug!("applied env overrides (vars={})", applied.join(","));
                layers.push(ConfigLayer {
                    source: ConfigLayerSource::Env,
                    path: None,
                    variables: applied,
                });
            }
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "memory.max_entries must be greater than zero".to_string(),
            ));
        }
        if self.memory.ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "memory.ttl_seconds must be greater than zero".to_string(),
            ));
        }
        if self.memory.sweep_interval_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "memory.sweep_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.chat.max_message_chars == 0 {
            return Err(ConfigError::Invalid(
                "chat.max_message_chars must be greater than zero".to_string(),
            ));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Invalid(
                "provider.temperature must be between 0 and 2".to_string(),
            ));
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<ParleyConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: ParleyConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
