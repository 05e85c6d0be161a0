// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Base of the mock clock; every mutation advances it by one second.
const MOCK_EPOCH_SECS: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        content: Vec<u8>,
        modified: SystemTime,
    },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    clock: u64,
    read_only_dirs: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
    latency: Option<Duration>,
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(MOCK_EPOCH_SECS + self.clock)
    }

    fn insert_file(&mut self, path: &Path, content: Vec<u8>) {
        let modified = self.tick();
        self.entries
            .insert(path.to_path_buf(), MockEntry::File { content, modified });
        self.link_into_parent(path);
    }

    fn ensure_dir(&mut self, path: &Path) {
        if self.entries.contains_key(path) {
            return;
        }
        self.entries
            .insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        self.link_into_parent(path);
    }

    // Ensure parent directories exist implicitly for simplicity in this mock
    fn link_into_parent(&mut self, path: &Path) {
        let Some(parent) = path.parent() else { return };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if parent == path {
            return;
        }
        self.ensure_dir(parent);
        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            self.entries.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if self.read_only_dirs.contains(parent) => {
                Err(anyhow!("Permission denied: {:?}", path))
            }
            _ => Ok(()),
        }
    }

    fn unlink(&mut self, path: &Path) -> Option<MockEntry> {
        let entry = self.entries.remove(path)?;
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(MockEntry::Dir(children)) = self.entries.get_mut(parent) {
                children.retain(|c| c.as_str() != name);
            }
        }
        Some(entry)
    }

    fn check_parent_dir(&self, path: &Path) -> Result<()> {
        match path.parent().and_then(|p| self.entries.get(p)) {
            Some(MockEntry::Dir(_)) => Ok(()),
            _ => Err(anyhow!("Destination directory not found: {:?}", path)),
        }
    }

    fn file_content(&self, path: &Path) -> Result<&Vec<u8>> {
        if self.unreadable.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match self.entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(content),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

/// In-memory filesystem with a deterministic modification clock.
///
/// Every write, copy or [`touch`](MockFileSystem::touch) stamps the file with
/// a strictly later mtime, so change detection never depends on the host's
/// timestamp granularity.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap();
        state.insert_file(path.as_ref(), content.into());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.ensure_dir(path.as_ref());
    }

    /// Bump a file's mtime without changing its contents.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        if let Some(MockEntry::File { modified, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified = now;
        }
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Names of the direct children of `dir`, sorted.
    pub fn list_names(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let state = self.state.lock().unwrap();
        match state.entries.get(dir.as_ref()) {
            Some(MockEntry::Dir(children)) => {
                let mut names = children.clone();
                names.sort();
                names
            }
            _ => Vec::new(),
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.unlink(path.as_ref());
    }

    /// Make writes and copies into `dir` fail.
    pub fn set_read_only(&self, dir: impl AsRef<Path>, read_only: bool) {
        let mut state = self.state.lock().unwrap();
        let dir = dir.as_ref().to_path_buf();
        if read_only {
            state.read_only_dirs.insert(dir);
        } else {
            state.read_only_dirs.remove(&dir);
        }
    }

    /// Make every directory listing block the calling thread for `latency`.
    pub fn set_latency(&self, latency: Duration) {
        let mut state = self.state.lock().unwrap();
        state.latency = Some(latency);
    }

    /// Make opening `path` for reading fail.
    pub fn set_unreadable(&self, path: impl AsRef<Path>, unreadable: bool) {
        let mut state = self.state.lock().unwrap();
        let path = path.as_ref().to_path_buf();
        if unreadable {
            state.unreadable.insert(path);
        } else {
            state.unreadable.remove(&path);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let state = self.state.lock().unwrap();
        let content = state.file_content(path)?;
        Ok(Box::new(Cursor::new(content.clone())))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check_writable(path)?;
        state.insert_file(path, contents.to_vec());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let content = state.file_content(from)?.clone();
        state.check_writable(to)?;
        state.check_parent_dir(to)?;
        let len = content.len() as u64;
        state.insert_file(to, content);
        Ok(len)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !matches!(state.entries.get(from), Some(MockEntry::File { .. })) {
            return Err(anyhow!("File not found: {:?}", from));
        }
        state.check_writable(from)?;
        state.check_writable(to)?;
        state.check_parent_dir(to)?;
        if let Some(entry) = state.unlink(from) {
            state.unlink(to);
            state.entries.insert(to.to_path_buf(), entry);
            state.link_into_parent(to);
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !matches!(state.entries.get(path), Some(MockEntry::File { .. })) {
            return Err(anyhow!("File not found: {:?}", path));
        }
        state.check_writable(path)?;
        state.unlink(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::File { .. }) = state.entries.get(path) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        state.ensure_dir(path);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let latency = self.state.lock().unwrap().latency;
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_write_advances_the_clock() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt", b"one".to_vec());
        let first = fs.modified(Path::new("/w/a.txt")).unwrap();
        fs.write(Path::new("/w/a.txt"), b"two").unwrap();
        let second = fs.modified(Path::new("/w/a.txt")).unwrap();
        fs.touch("/w/a.txt");
        let third = fs.modified(Path::new("/w/a.txt")).unwrap();

        assert!(first < second && second < third);
        assert_eq!(fs.read_file("/w/a.txt").unwrap(), b"two");
    }

    #[test]
    fn read_only_dir_rejects_copies() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt", b"x".to_vec());
        fs.add_dir("/b");
        fs.set_read_only("/b", true);

        assert!(fs.copy(Path::new("/w/a.txt"), Path::new("/b/a.txt")).is_err());
        assert!(!fs.exists(Path::new("/b/a.txt")));

        fs.set_read_only("/b", false);
        assert_eq!(fs.copy(Path::new("/w/a.txt"), Path::new("/b/a.txt")).unwrap(), 1);
    }

    #[test]
    fn rename_keeps_contents_and_mtime() {
        let fs = MockFileSystem::new();
        fs.add_file("/b/.snapwatch-a.partial", b"x".to_vec());
        fs.add_file("/b/a", b"old".to_vec());
        let staged_at = fs.modified(Path::new("/b/.snapwatch-a.partial")).unwrap();

        fs.rename(Path::new("/b/.snapwatch-a.partial"), Path::new("/b/a"))
            .unwrap();

        assert_eq!(fs.list_names("/b"), vec!["a".to_string()]);
        assert_eq!(fs.read_file("/b/a").unwrap(), b"x");
        assert_eq!(fs.modified(Path::new("/b/a")).unwrap(), staged_at);
        assert!(fs.rename(Path::new("/b/missing"), Path::new("/b/a")).is_err());
    }

    #[test]
    fn remove_unlinks_from_parent_listing() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt", b"x".to_vec());
        fs.add_file("/w/b.txt", b"y".to_vec());
        fs.remove("/w/a.txt");

        assert_eq!(fs.list_names("/w"), vec!["b.txt".to_string()]);
        assert!(fs.read_dir(Path::new("/w")).unwrap().len() == 1);
    }
}
