//! Content checksums for local box files.
//!
//! Files are hashed in chunks so memory stays bounded for multi-gigabyte
//! boxes. `verify` classifies a path against the digest from the manifest.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{SyncError, SyncResult};

const BUF_SIZE: usize = 64 * 1024;

/// Hash function named by a manifest entry's `checksum_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha256,
}

impl FromStr for ChecksumAlgorithm {
    type Err = SyncError;

    fn from_str(tag: &str) -> SyncResult<Self> {
        let normalized: String = tag
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(SyncError::UnsupportedChecksum(tag.to_string())),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumAlgorithm::Sha1 => write!(f, "sha1"),
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Outcome of checking a local path against an expected digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid { actual: String },
    /// Nothing on disk yet; not an error.
    Missing,
}

/// Compute the digest of a file and return it as lowercase hex.
/// The raw `io::Error` is returned so callers can tell absence from other failures.
pub fn hash_path(path: &Path, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    let f = File::open(path)?;
    match algorithm {
        ChecksumAlgorithm::Sha1 => digest_file::<Sha1>(f),
        ChecksumAlgorithm::Sha256 => digest_file::<Sha256>(f),
    }
}

fn digest_file<D: Digest>(mut f: File) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Classify `path` as Valid / Invalid / Missing against `expected`.
/// Comparison ignores hex case. I/O failures other than absence are errors.
pub fn verify(path: &Path, expected: &str, algorithm: ChecksumAlgorithm) -> SyncResult<Verdict> {
    match hash_path(path, algorithm) {
        Ok(actual) if actual.eq_ignore_ascii_case(expected.trim()) => Ok(Verdict::Valid),
        Ok(actual) => Ok(Verdict::Invalid { actual }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Verdict::Missing),
        Err(e) => Err(SyncError::ChecksumCompute {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
