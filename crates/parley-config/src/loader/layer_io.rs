//! IO helpers for reading config layers from disk.

use super::{ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed, schema-checked file layer.
#[derive(Debug, Clone)]
pub(super) struct LoadedLayer {
    pub(super) source: ConfigLayerSource,
    pub(super) path: PathBuf,
    pub(super) value: Value,
}

impl LoadedLayer {
    pub(super) fn meta(&self) -> ConfigLayer {
        ConfigLayer {
            source: self.source,
            path: Some(self.path.clone()),
            variables: Vec::new(),
        }
    }
}

/// Load a layer if the provided path exists.
pub(super) fn load_optional_layer(
    source: ConfigLayerSource,
    path: Option<&Path>,
) -> Result<Option<LoadedLayer>, ConfigError> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(
            "optional layer missing (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(None);
    }
    load_required_layer(source, path).map(Some)
}

/// Load and validate a layer that must exist.
pub(super) fn load_required_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    schema::validate_layer_schema(&value, &layer_label(source, path))?;
    Ok(LoadedLayer {
        source,
        path: path.to_path_buf(),
        value,
    })
}

/// Label used to prefix schema validation errors.
fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::System => "system",
        ConfigLayerSource::User => "user",
        ConfigLayerSource::Cwd => "cwd",
        ConfigLayerSource::Runtime => "runtime",
        ConfigLayerSource::Env => "env",
    };
    format!("{name}({})", path.display())
}

/// Canonical path used to skip a file discovered twice.
pub(super) fn unique_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

pub(super) fn default_system_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(super::SYSTEM_CONFIG_PATH))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// `~/.parley/parley.json5`, when a home directory is known.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
