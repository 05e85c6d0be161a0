// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, ConfigOverrides, RawConfigFile};
use crate::errors::Result;

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "Snapwatch.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Build the effective configuration for one invocation.
///
/// - An explicit `config_path` must exist.
/// - Without one, [`DEFAULT_CONFIG_FILE`] is used if present, otherwise the
///   built-in defaults.
/// - `overrides` are applied last, then the result is validated.
pub fn resolve(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ConfigFile> {
    let mut raw = match config_path {
        Some(path) => {
            debug!(?path, "loading config");
            load_from_path(path)?
        }
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "loading default config");
                load_from_path(&default_path)?
            } else {
                debug!("no config file; using defaults");
                RawConfigFile::default()
            }
        }
    };

    raw.apply_overrides(overrides);
    ConfigFile::try_from(raw)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
