// src/store/naming.rs

use crate::types::Digest;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Encodes (basename, digest) pairs into snapshot file names and back.
///
/// Decoding only accepts a name whose remainder after
/// `basename + separator` is a complete digest. With basenames `a` and
/// `a_b.txt` in the same backup directory, `a_b.txt_<digest>` is therefore
/// never reported as a version of `a`, whatever the separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNaming {
    separator: String,
}

impl Default for SnapshotNaming {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl SnapshotNaming {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn file_name(&self, basename: &str, digest: &Digest) -> String {
        format!("{basename}{}{digest}", self.separator)
    }

    /// If `entry_name` is a snapshot of `basename`, return its digest.
    pub fn digest_for(&self, basename: &str, entry_name: &str) -> Option<Digest> {
        entry_name
            .strip_prefix(basename)?
            .strip_prefix(self.separator.as_str())?
            .parse()
            .ok()
    }
}
