// src/hash.rs

//! Content hashing: the version identity of a file is the SHA-256 of its
//! bytes, rendered as lowercase hex. Names, timestamps and permissions never
//! feed into it.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest as _, Sha256};
use tracing::trace;

use crate::fs::FileSystem;
use crate::types::Digest;

/// Read size used while streaming a file through the hasher.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Compute the digest of a single file.
///
/// Fails only if the file cannot be opened or read; an empty file hashes to
/// the SHA-256 of the empty input.
pub fn compute_file_digest(fs: &dyn FileSystem, path: &Path) -> Result<Digest> {
    let reader = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let digest = digest_reader(reader).with_context(|| format!("hashing {:?}", path))?;
    trace!(?path, digest = %digest.short(), "hashed file");
    Ok(digest)
}

/// Stream any reader through SHA-256 in [`HASH_CHUNK_SIZE`] chunks.
pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Digest::from_hex_unchecked(format!("{:x}", hasher.finalize())))
}

/// Digest of an in-memory buffer.
pub fn digest_bytes(bytes: &[u8]) -> Digest {
    Digest::from_hex_unchecked(format!("{:x}", Sha256::digest(bytes)))
}
