//! Checksum command: compute the digest of a file.

use anyhow::Result;
use boxsync_core::checksum::{self, ChecksumAlgorithm};
use std::path::Path;

/// Compute and print the digest of the given file, `sha1sum`-style.
pub fn run_checksum(path: &Path, algorithm: &str) -> Result<()> {
    let algorithm: ChecksumAlgorithm = algorithm.parse()?;
    let digest = checksum::hash_path(path, algorithm)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
