// src/commands.rs

//! The three operating modes: monitor, list and revert.
//!
//! Output meant for the user is written to the supplied writers rather than
//! logged, so stdout stays scriptable.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::config::ConfigFile;
use crate::engine::{RunSummary, Runtime, RuntimeOptions, shutdown_channel};
use crate::fs::FileSystem;
use crate::store::BackupStore;
use crate::types::RevertOutcome;
use crate::watch::{DirectoryWatcher, ExcludePatterns};

/// Print every stored digest of `basename`. Returns how many were found.
pub fn list_versions(store: &BackupStore, basename: &str, out: &mut dyn Write) -> Result<usize> {
    let digests = store.list(basename)?;

    if digests.is_empty() {
        writeln!(out, "No versions found for {basename}")?;
    } else {
        writeln!(out, "Versions available for {basename}:")?;
        for digest in &digests {
            writeln!(out, " - {digest}")?;
        }
    }

    Ok(digests.len())
}

/// Restore the version of `basename` selected by `digest_prefix` into
/// `target_dir`.
///
/// A miss is not an error: it is reported on `err` and the outcome is
/// returned as [`RevertOutcome::NotFound`].
pub fn revert_version(
    store: &BackupStore,
    basename: &str,
    digest_prefix: &str,
    target_dir: &Path,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<RevertOutcome> {
    let outcome = store.revert(basename, digest_prefix, target_dir)?;

    match &outcome {
        RevertOutcome::Restored {
            digest, candidates, ..
        } => {
            writeln!(out, "Restored {basename} from {digest}")?;
            if *candidates > 1 {
                writeln!(
                    err,
                    "note: prefix '{digest_prefix}' matched {candidates} versions; used the first"
                )?;
            }
        }
        RevertOutcome::NotFound => {
            writeln!(
                err,
                "No version of {basename} matches digest prefix '{digest_prefix}'"
            )?;
        }
    }

    Ok(outcome)
}

/// Run the polling loop until Ctrl-C (or a single poll with `once`).
pub async fn monitor(
    fs: Arc<dyn FileSystem>,
    store: BackupStore,
    cfg: &ConfigFile,
    once: bool,
) -> Result<RunSummary> {
    let exclude = ExcludePatterns::new(cfg.exclude())?;
    let watcher = DirectoryWatcher::new(fs, cfg.watch_dir(), store, exclude)?;

    // Ctrl-C → graceful shutdown.
    let (trigger, signal) = shutdown_channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            // Keep the trigger alive; dropping it would stop the loop.
            std::future::pending::<()>().await;
        }
        trigger.trigger();
    });

    let options = RuntimeOptions {
        interval: cfg.interval(),
        exit_after_first_poll: once,
    };

    Runtime::new(watcher, signal, options).run().await
}

/// Resolved configuration, printed by `--dry-run`.
pub fn print_dry_run(cfg: &ConfigFile, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "snapwatch dry-run")?;
    writeln!(out, "  watch.dir = {}", cfg.watch_dir().display())?;
    writeln!(out, "  watch.interval_ms = {}", cfg.interval().as_millis())?;
    if !cfg.exclude().is_empty() {
        writeln!(out, "  watch.exclude = {:?}", cfg.exclude())?;
    }
    writeln!(out, "  backup.dir = {}", cfg.backup_dir().display())?;
    writeln!(out, "  backup.separator = {:?}", cfg.separator())?;
    Ok(())
}
