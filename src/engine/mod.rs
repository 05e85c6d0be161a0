// src/engine/mod.rs

//! Monitoring engine for snapwatch.
//!
//! The [`DirectoryWatcher`](crate::watch::DirectoryWatcher) knows how to scan
//! once; this module decides *when* to scan. The loop is:
//!
//! 1. stop if shutdown was requested,
//! 2. poll,
//! 3. sleep for the configured interval, waking early on shutdown.
//!
//! Cancellation is cooperative through [`ShutdownSignal`].

use std::time::Duration;

pub mod runtime;
pub mod shutdown;

pub use runtime::Runtime;
pub use shutdown::{ShutdownSignal, ShutdownTrigger, shutdown_channel};

/// Default pause between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Runtime options for the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Sleep between the end of one poll and the start of the next.
    pub interval: Duration,
    /// If true, exit after the first poll (used for `--once`).
    pub exit_after_first_poll: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            exit_after_first_poll: false,
        }
    }
}

/// Totals accumulated over the lifetime of one [`Runtime::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub polls: u64,
    pub snapshots_created: u64,
    pub failures: u64,
}
