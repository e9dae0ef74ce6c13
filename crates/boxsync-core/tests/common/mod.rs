#![allow(dead_code)]

pub mod box_server;

use sha1::{Digest, Sha1};

pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Manifest body for `(id, url, checksum)` entries, all sha1.
pub fn manifest_json(entries: &[(u64, String, String)]) -> String {
    let files: Vec<String> = entries
        .iter()
        .map(|(id, url, checksum)| {
            format!(
                r#"{{"id": {}, "url": "{}", "checksum": "{}", "checksum_type": "sha1"}}"#,
                id, url, checksum
            )
        })
        .collect();
    format!(r#"{{"files": [{}]}}"#, files.join(", "))
}
