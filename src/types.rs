// src/types.rs

//! Small value types shared between the hasher, the backup store and the
//! watcher.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Length of a rendered SHA-256 digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of a file's full contents.
///
/// Construction goes through [`Digest::from_str`] (or the hasher), so a
/// `Digest` is always exactly [`DIGEST_HEX_LEN`] lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(String);

impl Digest {
    pub(crate) fn from_hex_unchecked(hex: String) -> Self {
        debug_assert!(is_digest_hex(&hex));
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this digest starts with the given (possibly partial) hex
    /// prefix. The empty prefix matches every digest.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Abbreviated form used in log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_digest_hex(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(format!(
                "invalid digest: {s:?} (expected {DIGEST_HEX_LEN} lowercase hex characters)"
            ))
        }
    }
}

/// True if `s` is exactly one full lowercase hex digest.
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Result of asking the backup store to materialise a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// A new snapshot file was written.
    Created(PathBuf),
    /// A snapshot with this (basename, digest) already existed; nothing copied.
    AlreadyPresent(PathBuf),
}

impl SnapshotOutcome {
    pub fn path(&self) -> &Path {
        match self {
            SnapshotOutcome::Created(p) | SnapshotOutcome::AlreadyPresent(p) => p,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SnapshotOutcome::Created(_))
    }
}

/// Result of a revert request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertOutcome {
    Restored {
        digest: Digest,
        target: PathBuf,
        /// Number of snapshots the prefix matched (>1 means it was ambiguous).
        candidates: usize,
    },
    NotFound,
}

/// Per-cycle counters produced by a single watcher poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub scanned: usize,
    pub unchanged: usize,
    pub excluded: usize,
    pub created: usize,
    pub already_present: usize,
    pub failed: usize,
    /// The poll stopped early because shutdown was requested.
    pub interrupted: bool,
}

impl PollReport {
    pub fn changed(&self) -> usize {
        self.created + self.already_present + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn parses_full_lowercase_digest() {
        let d: Digest = ABC.parse().unwrap();
        assert_eq!(d.as_str(), ABC);
        assert_eq!(d.short(), "ba7816bf8f01");
        assert!(d.has_prefix("ba78"));
        assert!(d.has_prefix(""));
        assert!(!d.has_prefix("dead"));
    }

    #[test]
    fn rejects_uppercase_short_and_non_hex() {
        assert!(ABC.to_uppercase().parse::<Digest>().is_err());
        assert!("ba7816bf".parse::<Digest>().is_err());
        assert!(format!("{}z", &ABC[..63]).parse::<Digest>().is_err());
        assert!(format!("{ABC}.partial").parse::<Digest>().is_err());
    }
}
