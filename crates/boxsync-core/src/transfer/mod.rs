//! Byte transport used by the manifest fetcher and the orchestrator.
//!
//! The engine only depends on the `Transfer` trait; `CurlTransfer` is the
//! libcurl-backed implementation used by the CLI. Tests substitute their own.

mod http;

use std::path::Path;

use crate::error::TransferError;

pub use http::CurlTransfer;

/// Snapshot of one in-flight transfer, pushed by the transport as bytes arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub bytes_done: u64,
    /// Expected size in bytes; 0 while unknown.
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Fraction complete in [0.0, 1.0]; 0.0 while the size is unknown.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0) as u32
    }
}

/// Blocking transport primitive. Callers run it on a blocking thread.
pub trait Transfer: Send + Sync {
    /// GET `url` and return the whole body.
    fn get(&self, url: &str) -> Result<Vec<u8>, TransferError>;

    /// Stream `url` into `dest` (created or truncated), reporting progress
    /// through `on_progress`. Returns the number of bytes written. On error
    /// whatever was written so far stays on disk.
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<u64, TransferError>;
}
