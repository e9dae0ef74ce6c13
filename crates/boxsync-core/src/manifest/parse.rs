//! Manifest body decoding.

use crate::error::SyncResult;

use super::Catalog;

/// Decode a manifest body (`{"files": [...]}`). Any schema violation,
/// including a missing field on a single entry, rejects the whole document.
pub fn parse_catalog(body: &[u8]) -> SyncResult<Catalog> {
    Ok(serde_json::from_slice(body)?)
}
