// src/watch/mod.rs

//! Polling change detection for the watched directory.
//!
//! This module is responsible for:
//! - Remembering the last modification time seen for every basename.
//! - Enumerating the watched directory (non-recursively) on each poll.
//! - Hashing changed files and asking the [`BackupStore`](crate::store::BackupStore)
//!   for a snapshot.
//!
//! It does **not** schedule polls or handle signals; that is the engine's job.

pub mod patterns;
pub mod poller;
pub mod records;

pub use patterns::ExcludePatterns;
pub use poller::{DirectoryWatcher, ensure_watch_dir};
pub use records::WatchRecords;
