// src/watch/records.rs

use std::collections::HashMap;
use std::time::SystemTime;

/// Last observed modification time per basename.
///
/// Lives only in memory and starts empty on every process start, so the first
/// poll treats every file as changed. Entries are never removed when a file
/// disappears.
#[derive(Debug, Clone, Default)]
pub struct WatchRecords {
    seen: HashMap<String, SystemTime>,
}

impl WatchRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unseen files count as changed.
    pub fn is_changed(&self, basename: &str, modified: SystemTime) -> bool {
        self.seen.get(basename) != Some(&modified)
    }

    pub fn record(&mut self, basename: &str, modified: SystemTime) {
        self.seen.insert(basename.to_string(), modified);
    }

    pub fn last_seen(&self, basename: &str) -> Option<SystemTime> {
        self.seen.get(basename).copied()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn tracks_exact_timestamp_equality() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let mut records = WatchRecords::new();
        assert!(records.is_changed("a", t0));

        records.record("a", t0);
        assert!(!records.is_changed("a", t0));
        // Going backwards in time (e.g. a restored file) is also a change.
        assert!(records.is_changed("a", t0 - Duration::from_nanos(1)));
        assert!(records.is_changed("a", t0 + Duration::from_nanos(1)));
        assert_eq!(records.last_seen("a"), Some(t0));
        assert_eq!(records.len(), 1);
    }
}
