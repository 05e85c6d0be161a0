// src/engine/runtime.rs

use anyhow::Context;
use tracing::{debug, error, info};

use crate::engine::{RunSummary, RuntimeOptions, ShutdownSignal};
use crate::watch::DirectoryWatcher;

/// Drives a [`DirectoryWatcher`] on a fixed interval until shutdown.
#[derive(Debug)]
pub struct Runtime {
    watcher: DirectoryWatcher,
    shutdown: ShutdownSignal,
    options: RuntimeOptions,
}

impl Runtime {
    pub fn new(watcher: DirectoryWatcher, shutdown: ShutdownSignal, options: RuntimeOptions) -> Self {
        Self {
            watcher,
            shutdown,
            options,
        }
    }

    /// Main polling loop.
    ///
    /// Each poll hashes and copies files, so it runs on the blocking pool
    /// and the watcher is handed back when it finishes. Poll errors (for
    /// example the watched directory vanishing after start) are logged and
    /// the loop keeps going; only shutdown or a panicking poll ends it.
    pub async fn run(self) -> anyhow::Result<RunSummary> {
        let Runtime {
            mut watcher,
            mut shutdown,
            options,
        } = self;

        info!(
            watch_dir = ?watcher.watch_dir(),
            backup_dir = ?watcher.store().dir(),
            interval_ms = options.interval.as_millis() as u64,
            "monitoring started"
        );

        let mut summary = RunSummary::default();

        loop {
            if shutdown.is_requested() {
                break;
            }

            summary.polls += 1;
            let signal = shutdown.clone();
            let (returned, result) = tokio::task::spawn_blocking(move || {
                let result = watcher.poll(&signal);
                (watcher, result)
            })
            .await
            .context("poll task panicked")?;
            watcher = returned;

            match result {
                Ok(report) => {
                    summary.snapshots_created += report.created as u64;
                    summary.failures += report.failed as u64;
                }
                Err(err) => {
                    error!(error = %format!("{err:#}"), "poll failed");
                    summary.failures += 1;
                }
            }

            if options.exit_after_first_poll {
                debug!("single poll requested; exiting");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(options.interval) => {}
                _ = shutdown.requested() => {}
            }
        }

        info!(
            polls = summary.polls,
            snapshots_created = summary.snapshots_created,
            "monitoring stopped"
        );
        Ok(summary)
    }
}
