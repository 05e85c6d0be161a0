#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tempfile::TempDir;

use snapwatch::fs::{FileSystem, RealFileSystem, staging_path};
use snapwatch::store::{BackupStore, SnapshotNaming};
use snapwatch::watch::{DirectoryWatcher, ExcludePatterns};

/// A temporary `input/` + `output/` pair on the real filesystem.
///
/// Writes go through [`Workspace::write`], which stamps each file with a
/// strictly increasing mtime so change detection does not depend on the
/// filesystem's timestamp resolution.
pub struct Workspace {
    root: TempDir,
    clock: u64,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir()?;
        fs::create_dir(root.path().join("input"))?;
        Ok(Self { root, clock: 0 })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn input(&self) -> PathBuf {
        self.root.path().join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("output")
    }

    pub fn write(&mut self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.input().join(name);
        // Staged under a name the watcher ignores, then renamed into place, so
        // a concurrently running watcher never hashes a half-written file.
        let staged = staging_path(&path)?;
        fs::write(&staged, contents)?;
        self.clock += 1;
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + self.clock);
        fs::File::options().write(true).open(&staged)?.set_modified(stamp)?;
        fs::rename(&staged, &path)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.input().join(name))?)
    }

    /// Sorted names of everything in the backup directory.
    pub fn backup_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if self.output().exists() {
            for entry in fs::read_dir(self.output())? {
                names.push(entry?.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn store(&self) -> Result<BackupStore> {
        self.store_with(SnapshotNaming::default())
    }

    pub fn store_with(&self, naming: SnapshotNaming) -> Result<BackupStore> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        BackupStore::open(fs, self.output(), naming)
    }

    pub fn watcher(&self) -> Result<DirectoryWatcher> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = self.store()?;
        Ok(DirectoryWatcher::new(fs, self.input(), store, ExcludePatterns::default())?)
    }
}
