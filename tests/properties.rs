// tests/properties.rs

use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;

use snapwatch::engine::shutdown_channel;
use snapwatch::fs::FileSystem;
use snapwatch::fs::mock::MockFileSystem;
use snapwatch::hash::{compute_file_digest, digest_bytes, digest_reader};
use snapwatch::store::{BackupStore, SnapshotNaming};
use snapwatch::types::is_digest_hex;
use snapwatch::watch::{DirectoryWatcher, ExcludePatterns};

fn mock_watcher(fs: &MockFileSystem) -> DirectoryWatcher {
    fs.add_dir("/w");
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let store = BackupStore::open(shared.clone(), "/b", SnapshotNaming::default()).unwrap();
    DirectoryWatcher::new(shared, "/w", store, ExcludePatterns::default()).unwrap()
}

proptest! {
    #[test]
    fn digest_is_a_pure_function_of_bytes(data in proptest::collection::vec(any::<u8>(), 0..10_000)) {
        let a = digest_bytes(&data);
        let b = digest_reader(std::io::Cursor::new(data.clone())).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(is_digest_hex(a.as_str()));

        let fs = MockFileSystem::new();
        fs.add_file("/w/x", data);
        let c = compute_file_digest(&fs, Path::new("/w/x")).unwrap();
        prop_assert_eq!(a, c);
    }

    #[test]
    fn distinct_contents_give_distinct_digests(
        a in proptest::collection::vec(any::<u8>(), 0..256),
        b in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(digest_bytes(&a), digest_bytes(&b));
    }

    /// After writing a sequence of contents to one file (polling after each
    /// write), `list` returns exactly the distinct digests written.
    #[test]
    fn list_matches_distinct_versions_written(
        versions in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..32), 1..8),
    ) {
        let fs = MockFileSystem::new();
        let mut watcher = mock_watcher(&fs);
        let (_trigger, signal) = shutdown_channel();

        for v in &versions {
            fs.write(Path::new("/w/f.txt"), v).unwrap();
            watcher.poll(&signal).unwrap();
        }

        let mut expected: Vec<_> = versions.iter().map(|v| digest_bytes(v)).collect();
        expected.sort();
        expected.dedup();

        prop_assert_eq!(watcher.store().list("f.txt").unwrap(), expected);
    }

    #[test]
    fn unique_prefix_reverts_exact_bytes(
        versions in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 1..32), 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let versions: Vec<Vec<u8>> = versions.into_iter().collect();
        let fs = MockFileSystem::new();
        let mut watcher = mock_watcher(&fs);
        let (_trigger, signal) = shutdown_channel();

        for v in &versions {
            fs.write(Path::new("/w/f"), v).unwrap();
            watcher.poll(&signal).unwrap();
        }

        let wanted = pick.get(&versions);
        let digest = digest_bytes(wanted);
        // A full digest is always a unique prefix.
        watcher.store().revert("f", digest.as_str(), Path::new("/w")).unwrap();

        prop_assert_eq!(fs.read_file("/w/f").unwrap(), wanted.clone());
    }
}
