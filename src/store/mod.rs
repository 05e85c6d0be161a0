// src/store/mod.rs

//! The backup directory and the snapshots inside it.
//!
//! A snapshot is a full copy of a watched file stored flat in the backup
//! directory as `<basename><separator><digest>`. There is no index file: the
//! directory listing *is* the index, and everything here is discovered by
//! parsing entry names back through [`SnapshotNaming`].

pub mod backup;
pub mod naming;

pub use backup::{BackupStore, validate_basename};
pub use naming::{DEFAULT_SEPARATOR, SnapshotNaming};
