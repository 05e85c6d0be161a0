// src/config/mod.rs

//! Configuration loading and validation for snapwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI overrides (`loader.rs`).
//! - Validate basic invariants like distinct directories (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path, resolve};
pub use model::{BackupSection, ConfigFile, ConfigOverrides, RawConfigFile, WatchSection};
pub use validate::validate_config;
