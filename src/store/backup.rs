// src/store/backup.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::fs::{FileSystem, copy_replacing, staging_path};
use crate::hash::compute_file_digest;
use crate::store::naming::SnapshotNaming;
use crate::types::{Digest, RevertOutcome, SnapshotOutcome};

/// Reject basenames that are not a single plain path component.
///
/// Revert writes to `<watch dir>/<basename>`, so `..` or an embedded
/// separator would escape the watched directory.
pub fn validate_basename(basename: &str) -> Result<()> {
    if basename.is_empty() || basename == "." || basename == ".." {
        bail!("invalid file name: {basename:?}");
    }
    if basename.contains(['/', '\\', '\0']) {
        bail!("file name must not contain path separators: {basename:?}");
    }
    Ok(())
}

/// Persists, enumerates and restores snapshots in one backup directory.
#[derive(Clone)]
pub struct BackupStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    naming: SnapshotNaming,
}

impl fmt::Debug for BackupStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupStore")
            .field("dir", &self.dir)
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl BackupStore {
    /// Open the store, creating the backup directory if it is absent.
    pub fn open(
        fs: Arc<dyn FileSystem>,
        dir: impl Into<PathBuf>,
        naming: SnapshotNaming,
    ) -> Result<Self> {
        let dir = dir.into();
        if !fs.is_dir(&dir) {
            if fs.exists(&dir) {
                bail!("backup path exists but is not a directory: {:?}", dir);
            }
            fs.create_dir_all(&dir)
                .with_context(|| format!("creating backup directory {:?}", dir))?;
            info!(?dir, "created backup directory");
        }
        Ok(Self { fs, dir, naming })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn naming(&self) -> &SnapshotNaming {
        &self.naming
    }

    pub fn snapshot_path(&self, basename: &str, digest: &Digest) -> PathBuf {
        self.dir.join(self.naming.file_name(basename, digest))
    }

    /// Materialise a snapshot of `source` under (basename, digest).
    ///
    /// The name is derived from the content digest, so an existing file at
    /// that name already holds these bytes and the copy is skipped. Otherwise
    /// the source is copied into a staging file which is hashed again before
    /// being renamed into place; if the source changed after `digest` was
    /// computed the staged copy is discarded and an error is returned.
    pub fn snapshot(&self, basename: &str, digest: &Digest, source: &Path) -> Result<SnapshotOutcome> {
        let dest = self.snapshot_path(basename, digest);

        if self.fs.is_file(&dest) {
            debug!(basename, digest = %digest.short(), "snapshot already present");
            return Ok(SnapshotOutcome::AlreadyPresent(dest));
        }

        let staged = staging_path(&dest)?;
        let bytes = match self.stage(source, &staged, digest) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = self.fs.remove_file(&staged);
                return Err(e);
            }
        };
        if let Err(e) = self.fs.rename(&staged, &dest) {
            let _ = self.fs.remove_file(&staged);
            return Err(e).with_context(|| format!("storing snapshot as {:?}", dest));
        }

        info!(basename, digest = %digest, bytes, path = ?dest, "saved new version");
        Ok(SnapshotOutcome::Created(dest))
    }

    /// Copy `source` to `staged` and check the copy hashes to `expected`.
    fn stage(&self, source: &Path, staged: &Path, expected: &Digest) -> Result<u64> {
        let bytes = self
            .fs
            .copy(source, staged)
            .with_context(|| format!("copying {:?} to {:?}", source, staged))?;
        let copied = compute_file_digest(self.fs.as_ref(), staged)?;
        if &copied != expected {
            bail!(
                "{:?} changed while being copied (expected {}, copied {})",
                source,
                expected.short(),
                copied.short()
            );
        }
        Ok(bytes)
    }

    /// Every stored digest for `basename`, sorted lexicographically.
    ///
    /// A name that could never be watched (empty, `..`, containing a path
    /// separator) has no snapshots.
    pub fn list(&self, basename: &str) -> Result<Vec<Digest>> {
        if let Err(e) = validate_basename(basename) {
            debug!(basename, error = %e, "not a plain file name; no snapshots");
            return Ok(Vec::new());
        }

        let entries = self
            .fs
            .read_dir(&self.dir)
            .with_context(|| format!("scanning backup directory {:?}", self.dir))?;

        let mut digests: Vec<Digest> = entries
            .iter()
            .filter(|path| self.fs.is_file(path))
            .filter_map(|path| path.file_name()?.to_str())
            .filter_map(|name| self.naming.digest_for(basename, name))
            .collect();
        digests.sort();
        digests.dedup();

        debug!(basename, count = digests.len(), "listed snapshots");
        Ok(digests)
    }

    /// Digests for `basename` that start with `prefix`, in the same order as
    /// [`list`](Self::list).
    pub fn find(&self, basename: &str, prefix: &str) -> Result<Vec<Digest>> {
        Ok(self
            .list(basename)?
            .into_iter()
            .filter(|d| d.has_prefix(prefix))
            .collect())
    }

    /// Restore the first snapshot of `basename` whose digest starts with
    /// `prefix` into `target_dir/basename`, replacing whatever is there.
    ///
    /// "First" is the lexicographically smallest matching digest. When
    /// nothing matches the target is left untouched.
    pub fn revert(&self, basename: &str, prefix: &str, target_dir: &Path) -> Result<RevertOutcome> {
        let candidates = self.find(basename, prefix)?;

        let Some(digest) = candidates.first().cloned() else {
            debug!(basename, prefix, "no snapshot matches prefix");
            return Ok(RevertOutcome::NotFound);
        };

        if candidates.len() > 1 {
            warn!(
                basename,
                prefix,
                candidates = candidates.len(),
                chosen = %digest,
                "digest prefix is ambiguous; restoring the first match"
            );
        }

        let source = self.snapshot_path(basename, &digest);
        let target = target_dir.join(basename);
        copy_replacing(self.fs.as_ref(), &source, &target)
            .with_context(|| format!("restoring {:?} to {:?}", source, target))?;
        info!(basename, digest = %digest, path = ?target, "restored version");

        Ok(RevertOutcome::Restored {
            digest,
            target,
            candidates: candidates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::hash::digest_bytes;

    fn store_with(fs: &MockFileSystem) -> BackupStore {
        fs.add_dir("/w");
        BackupStore::open(Arc::new(fs.clone()), "/b", SnapshotNaming::default()).unwrap()
    }

    #[test]
    fn open_creates_missing_directory() {
        let fs = MockFileSystem::new();
        assert!(!fs.is_dir(Path::new("/b")));
        store_with(&fs);
        assert!(fs.is_dir(Path::new("/b")));
    }

    #[test]
    fn open_rejects_file_in_the_way() {
        let fs = MockFileSystem::new();
        fs.add_file("/b", b"not a dir".to_vec());
        assert!(BackupStore::open(Arc::new(fs), "/b", SnapshotNaming::default()).is_err());
    }

    #[test]
    fn snapshot_then_list() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        fs.add_file("/w/notes.txt", b"abc".to_vec());
        let d = digest_bytes(b"abc");

        let outcome = store.snapshot("notes.txt", &d, Path::new("/w/notes.txt")).unwrap();

        assert!(outcome.is_created());
        assert_eq!(fs.read_file(outcome.path()).unwrap(), b"abc");
        assert_eq!(store.list("notes.txt").unwrap(), vec![d]);
    }

    #[test]
    fn second_snapshot_of_same_digest_is_skipped() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        fs.add_file("/w/a", b"abc".to_vec());
        let d = digest_bytes(b"abc");

        store.snapshot("a", &d, Path::new("/w/a")).unwrap();
        let again = store.snapshot("a", &d, Path::new("/w/a")).unwrap();

        assert_eq!(again, SnapshotOutcome::AlreadyPresent(store.snapshot_path("a", &d)));
        assert_eq!(fs.list_names("/b").len(), 1);
    }

    #[test]
    fn list_ignores_other_basenames_and_junk() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let d1 = digest_bytes(b"1");
        let d2 = digest_bytes(b"2");
        fs.add_file(format!("/b/a_{d1}"), b"1".to_vec());
        fs.add_file(format!("/b/a_{d2}"), b"2".to_vec());
        fs.add_file(format!("/b/a_b_{d1}"), b"1".to_vec());
        fs.add_file(format!("/b/ab_{d1}"), b"1".to_vec());
        fs.add_file("/b/a_README", b"?".to_vec());
        fs.add_dir(format!("/b/a_{}", digest_bytes(b"dir")));

        let mut expected = vec![d1, d2];
        expected.sort();
        assert_eq!(store.list("a").unwrap(), expected);
        assert!(store.list("missing").unwrap().is_empty());
    }

    #[test]
    fn snapshot_of_source_edited_after_hashing_is_refused() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        fs.add_file("/w/a", b"v1".to_vec());
        let hashed = digest_bytes(b"v1");
        fs.write(Path::new("/w/a"), b"v2").unwrap();

        let err = store.snapshot("a", &hashed, Path::new("/w/a")).unwrap_err();

        assert!(format!("{err:#}").contains("changed while being copied"), "{err:#}");
        assert!(fs.list_names("/b").is_empty(), "left behind: {:?}", fs.list_names("/b"));
    }

    #[test]
    fn failed_copy_leaves_no_staging_file() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let d = digest_bytes(b"abc");

        assert!(store.snapshot("a", &d, Path::new("/w/missing")).is_err());
        assert!(fs.list_names("/b").is_empty());
    }

    #[test]
    fn path_like_basenames_have_no_snapshots() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let d = digest_bytes(b"x");
        fs.add_file(format!("/b/_{d}"), b"x".to_vec());

        assert!(store.list("").unwrap().is_empty());
        assert!(store.list("..").unwrap().is_empty());
        assert!(store.list("dir/file").unwrap().is_empty());
        assert_eq!(
            store.revert("..", "", Path::new("/w")).unwrap(),
            RevertOutcome::NotFound
        );
    }

    #[test]
    fn revert_restores_matching_snapshot() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let old = digest_bytes(b"abc");
        fs.add_file(format!("/b/notes.txt_{old}"), b"abc".to_vec());
        fs.add_file("/w/notes.txt", b"abcd".to_vec());

        let outcome = store.revert("notes.txt", &old.as_str()[..8], Path::new("/w")).unwrap();

        assert_eq!(
            outcome,
            RevertOutcome::Restored {
                digest: old,
                target: PathBuf::from("/w/notes.txt"),
                candidates: 1,
            }
        );
        assert_eq!(fs.read_file("/w/notes.txt").unwrap(), b"abc");
    }

    #[test]
    fn revert_miss_leaves_target_alone() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let d = digest_bytes(b"abc");
        fs.add_file(format!("/b/notes.txt_{d}"), b"abc".to_vec());
        fs.add_file("/w/notes.txt", b"current".to_vec());
        let before = fs.modified(Path::new("/w/notes.txt")).unwrap();

        let outcome = store.revert("notes.txt", "not-hex", Path::new("/w")).unwrap();

        assert_eq!(outcome, RevertOutcome::NotFound);
        assert_eq!(fs.read_file("/w/notes.txt").unwrap(), b"current");
        assert_eq!(fs.modified(Path::new("/w/notes.txt")).unwrap(), before);
    }

    #[test]
    fn ambiguous_prefix_picks_smallest_digest() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let mut digests = vec![digest_bytes(b"one"), digest_bytes(b"two"), digest_bytes(b"three")];
        for (d, body) in digests.iter().zip(["one", "two", "three"]) {
            fs.add_file(format!("/b/f_{d}"), body.as_bytes().to_vec());
        }
        digests.sort();

        let outcome = store.revert("f", "", Path::new("/w")).unwrap();

        match outcome {
            RevertOutcome::Restored { digest, candidates, .. } => {
                assert_eq!(digest, digests[0]);
                assert_eq!(candidates, 3);
            }
            RevertOutcome::NotFound => panic!("expected a restore"),
        }
    }
}
