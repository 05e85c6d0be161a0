// src/watch/poller.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, trace, warn};

use crate::engine::ShutdownSignal;
use crate::errors::{Result, SnapwatchError};
use crate::fs::{FileSystem, is_staging_name};
use crate::hash::compute_file_digest;
use crate::store::BackupStore;
use crate::types::{PollReport, SnapshotOutcome};
use crate::watch::patterns::ExcludePatterns;
use crate::watch::records::WatchRecords;

/// Fail unless `dir` exists and is a directory.
pub fn ensure_watch_dir(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    if fs.is_dir(dir) {
        Ok(())
    } else {
        Err(SnapwatchError::InvalidWatchDir(dir.to_path_buf()))
    }
}

/// Polls one directory and snapshots every file whose mtime moved.
///
/// Each call to [`poll`](Self::poll) is one `Scanning` pass; between passes
/// the watcher is idle and holds only its [`WatchRecords`].
pub struct DirectoryWatcher {
    fs: Arc<dyn FileSystem>,
    watch_dir: PathBuf,
    store: BackupStore,
    exclude: ExcludePatterns,
    records: WatchRecords,
}

impl fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("watch_dir", &self.watch_dir)
            .field("store", &self.store)
            .field("tracked", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl DirectoryWatcher {
    /// Create a watcher. A missing or non-directory `watch_dir` is fatal.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        watch_dir: impl Into<PathBuf>,
        store: BackupStore,
        exclude: ExcludePatterns,
    ) -> Result<Self> {
        let watch_dir = watch_dir.into();
        ensure_watch_dir(fs.as_ref(), &watch_dir)?;
        Ok(Self {
            fs,
            watch_dir,
            store,
            exclude,
            records: WatchRecords::new(),
        })
    }

    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    pub fn store(&self) -> &BackupStore {
        &self.store
    }

    pub fn records(&self) -> &WatchRecords {
        &self.records
    }

    /// Scan the watched directory once.
    ///
    /// Only a failure to enumerate the directory is returned as an error.
    /// Per-file problems are logged, counted in the report and retried on the
    /// next poll: a file's record only advances once its snapshot exists.
    ///
    /// `shutdown` is checked before every file, so a requested stop is
    /// honoured after at most one hash-and-copy.
    pub fn poll(&mut self, shutdown: &ShutdownSignal) -> anyhow::Result<PollReport> {
        let mut entries = self
            .fs
            .read_dir(&self.watch_dir)
            .with_context(|| format!("enumerating watched directory {:?}", self.watch_dir))?;
        entries.sort();

        let mut report = PollReport::default();

        for path in entries {
            if shutdown.is_requested() {
                debug!("shutdown requested; stopping poll early");
                report.interrupted = true;
                break;
            }

            if !self.fs.is_file(&path) {
                continue;
            }

            let Some(basename) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(?path, "skipping file with non UTF-8 name");
                continue;
            };
            if is_staging_name(basename) {
                debug!(basename, "skipping staging file");
                continue;
            }
            let basename = basename.to_string();

            report.scanned += 1;

            if self.exclude.is_excluded(&basename) {
                trace!(basename = %basename, "excluded");
                report.excluded += 1;
                continue;
            }

            let modified = match self.fs.modified(&path) {
                Ok(t) => t,
                Err(err) => {
                    warn!(basename = %basename, error = %format!("{err:#}"), "could not read modification time");
                    report.failed += 1;
                    continue;
                }
            };

            if !self.records.is_changed(&basename, modified) {
                trace!(basename = %basename, "unchanged");
                report.unchanged += 1;
                continue;
            }

            match self.capture(&basename, &path) {
                Ok(outcome) => {
                    self.records.record(&basename, modified);
                    match outcome {
                        SnapshotOutcome::Created(_) => report.created += 1,
                        SnapshotOutcome::AlreadyPresent(_) => report.already_present += 1,
                    }
                }
                Err(err) => {
                    warn!(
                        basename = %basename,
                        error = %format!("{err:#}"),
                        "failed to snapshot file; will retry on next poll"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.changed() > 0 {
            info!(
                created = report.created,
                already_present = report.already_present,
                failed = report.failed,
                "poll finished"
            );
        } else {
            trace!(scanned = report.scanned, "poll finished; nothing changed");
        }

        Ok(report)
    }

    fn capture(&self, basename: &str, path: &Path) -> anyhow::Result<SnapshotOutcome> {
        let digest = compute_file_digest(self.fs.as_ref(), path)?;
        debug!(basename, digest = %digest.short(), "change detected");
        self.store.snapshot(basename, &digest, path)
    }
}
