// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::store::DEFAULT_SEPARATOR;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// dir = "input"
/// interval_ms = 2000
/// exclude = ["*.swp"]
///
/// [backup]
/// dir = "output"
/// separator = "_"
/// ```
///
/// All sections and keys are optional and have the defaults shown above
/// (except `exclude`, which defaults to empty).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub backup: BackupSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory whose regular files are versioned (not recursive).
    #[serde(default = "default_watch_dir")]
    pub dir: PathBuf,

    /// Pause between polls, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Basename globs that are never snapshotted.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_watch_dir() -> PathBuf {
    PathBuf::from("input")
}

fn default_interval_ms() -> u64 {
    2000
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            dir: default_watch_dir(),
            interval_ms: default_interval_ms(),
            exclude: Vec::new(),
        }
    }
}

/// `[backup]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupSection {
    /// Flat directory holding every snapshot; created when missing.
    #[serde(default = "default_backup_dir")]
    pub dir: PathBuf,

    /// Joins basename and digest in snapshot file names.
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for BackupSection {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
            separator: default_separator(),
        }
    }
}

/// Values given on the command line; each one beats the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub watch_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub separator: Option<String>,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.watch_dir {
            self.watch.dir = dir.clone();
        }
        if let Some(dir) = &overrides.backup_dir {
            self.backup.dir = dir.clone();
        }
        if let Some(ms) = overrides.interval_ms {
            self.watch.interval_ms = ms;
        }
        if let Some(sep) = &overrides.separator {
            self.backup.separator = sep.clone();
        }
    }
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    backup: BackupSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, backup: BackupSection) -> Self {
        Self { watch, backup }
    }

    pub fn watch_dir(&self) -> &Path {
        &self.watch.dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup.dir
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms)
    }

    pub fn exclude(&self) -> &[String] {
        &self.watch.exclude
    }

    pub fn separator(&self) -> &str {
        &self.backup.separator
    }
}
