//! Error types shared across the sync engine.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for engine operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Failure of the byte transport (manifest GET or artifact transfer).
#[derive(Debug, Error)]
pub enum TransferError {
    /// libcurl reported an error (connect, timeout, aborted write, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Server answered with a failure status (>= 400).
    #[error("HTTP {0}")]
    Http(u32),
    /// Local destination could not be opened or written.
    #[error("storage: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransferError,
    },

    #[error("manifest does not match the catalog schema: {0}")]
    Format(#[from] serde_json::Error),

    /// Hashing failed for a file that does exist.
    #[error("failed to compute checksum of {}: {source}", path.display())]
    ChecksumCompute {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checksum mismatch after download for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("unsupported checksum type '{0}'")]
    UnsupportedChecksum(String),

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Every deletion that failed during one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileError {
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl ReconcileError {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn push(&mut self, path: PathBuf, err: io::Error) {
        self.failures.push((path, err));
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to delete {} obsolete file(s): ", self.failures.len())?;
        for (i, (path, err)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", path.display(), err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ReconcileError {}
