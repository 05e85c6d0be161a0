// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SnapwatchError};
use crate::watch::patterns::build_globset;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SnapwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.backup))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_interval(cfg)?;
    validate_separator(cfg)?;
    validate_directories(cfg)?;
    validate_exclude(cfg)?;
    Ok(())
}

fn validate_interval(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.interval_ms == 0 {
        return Err(SnapwatchError::ConfigError(
            "[watch].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_separator(cfg: &RawConfigFile) -> Result<()> {
    let sep = &cfg.backup.separator;
    if sep.is_empty() {
        return Err(SnapwatchError::ConfigError(
            "[backup].separator must not be empty".to_string(),
        ));
    }
    if sep.contains(['/', '\\', '\0']) {
        return Err(SnapwatchError::ConfigError(format!(
            "[backup].separator must not contain path separators (got {sep:?})"
        )));
    }
    Ok(())
}

fn validate_directories(cfg: &RawConfigFile) -> Result<()> {
    let watch = &cfg.watch.dir;
    let backup = &cfg.backup.dir;

    let same = watch == backup
        || matches!(
            (std::fs::canonicalize(watch), std::fs::canonicalize(backup)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(SnapwatchError::ConfigError(format!(
            "watch and backup directories must differ (both are {})",
            watch.display()
        )));
    }
    Ok(())
}

fn validate_exclude(cfg: &RawConfigFile) -> Result<()> {
    build_globset(&cfg.watch.exclude)
        .map_err(|e| SnapwatchError::ConfigError(format!("[watch].exclude: {e:#}")))?;
    Ok(())
}
