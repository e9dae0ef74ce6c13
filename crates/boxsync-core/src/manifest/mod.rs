//! Remote box manifest: model and retrieval.
//!
//! The manifest is a single JSON document listing every box that should
//! exist in the local directory together with its expected checksum.

mod parse;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::transfer::Transfer;

pub use parse::parse_catalog;

/// One box listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub id: u64,
    pub url: String,
    /// Expected digest, hex.
    pub checksum: String,
    /// Hash function tag, e.g. "sha1".
    pub checksum_type: String,
}

impl ArtifactDescriptor {
    /// Local file for this box: `target_dir/<id>`.
    pub fn local_path(&self, target_dir: &Path) -> PathBuf {
        target_dir.join(self.id.to_string())
    }
}

/// Parsed manifest. Entry order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub files: Vec<ArtifactDescriptor>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactDescriptor> {
        self.files.iter()
    }
}

impl IntoIterator for Catalog {
    type Item = ArtifactDescriptor;
    type IntoIter = std::vec::IntoIter<ArtifactDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Download and parse the manifest at `uri` with a single GET.
///
/// No retry: a failure here aborts the whole run before anything on disk
/// is touched.
pub fn fetch(uri: &str, transfer: &dyn Transfer) -> SyncResult<Catalog> {
    tracing::info!(url = %uri, "downloading manifest");
    let body = transfer.get(uri).map_err(|source| SyncError::Transport {
        url: uri.to_string(),
        source,
    })?;
    let catalog = parse_catalog(&body)?;
    tracing::debug!(count = catalog.len(), "found boxes in manifest");
    Ok(catalog)
}
