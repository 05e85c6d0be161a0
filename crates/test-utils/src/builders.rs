#![allow(dead_code)]

use std::path::{Path, PathBuf};

use snapwatch::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Point both directories at `<root>/input` and `<root>/output`.
    pub fn rooted_at(root: &Path) -> Self {
        Self::new()
            .watch_dir(root.join("input"))
            .backup_dir(root.join("output"))
    }

    pub fn watch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.watch.dir = dir.into();
        self
    }

    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.backup.dir = dir.into();
        self
    }

    pub fn interval_ms(mut self, ms: u64) -> Self {
        self.config.watch.interval_ms = ms;
        self
    }

    pub fn separator(mut self, sep: &str) -> Self {
        self.config.backup.separator = sep.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
