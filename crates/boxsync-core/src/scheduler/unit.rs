//! Processing of a single manifest entry: validate, download, re-validate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::Sender;

use crate::checksum::{self, ChecksumAlgorithm, Verdict};
use crate::error::{SyncError, SyncResult};
use crate::manifest::ArtifactDescriptor;
use crate::transfer::{Transfer, TransferProgress};

use super::outcome::{ArtifactProgress, ArtifactReport, Outcome};
use super::touched::TouchedSet;

/// State shared by every unit of one run.
pub(super) struct UnitContext {
    pub(super) target_dir: PathBuf,
    pub(super) touched: TouchedSet,
    pub(super) transfer: Arc<dyn Transfer>,
    pub(super) progress_tx: Option<Sender<ArtifactProgress>>,
}

/// Process one box. Never fails: errors become `Outcome::Failed` attributed
/// to this box and are logged here.
pub(super) fn process_artifact(ctx: &UnitContext, desc: &ArtifactDescriptor) -> ArtifactReport {
    let path = desc.local_path(&ctx.target_dir);
    tracing::debug!(id = desc.id, url = %desc.url, path = %path.display(), "processing box");

    ctx.touched.insert(path.clone());

    let outcome = match sync_artifact(ctx, desc, &path) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(id = desc.id, error = %e, "box sync failed");
            Outcome::Failed(e.to_string())
        }
    };
    tracing::info!(id = desc.id, url = %desc.url, outcome = %outcome, "box processed");

    ArtifactReport {
        id: desc.id,
        url: desc.url.clone(),
        path,
        outcome,
    }
}

fn sync_artifact(ctx: &UnitContext, desc: &ArtifactDescriptor, path: &Path) -> SyncResult<Outcome> {
    let algorithm: ChecksumAlgorithm = desc.checksum_type.parse()?;

    match checksum::verify(path, &desc.checksum, algorithm)? {
        Verdict::Valid => return Ok(Outcome::UpToDate),
        Verdict::Invalid { actual } => {
            tracing::debug!(id = desc.id, expected = %desc.checksum, %actual, "local box is outdated");
        }
        Verdict::Missing => {
            tracing::debug!(id = desc.id, "local box is missing");
        }
    }

    tracing::info!(id = desc.id, url = %desc.url, path = %path.display(), "downloading box");
    let mut last: Option<TransferProgress> = None;
    let mut on_progress = |progress: TransferProgress| {
        if last == Some(progress) {
            return;
        }
        last = Some(progress);
        if let Some(tx) = &ctx.progress_tx {
            // Progress is operator feedback only; drop events when the consumer lags.
            let _ = tx.try_send(ArtifactProgress { id: desc.id, progress });
        }
    };
    let bytes = ctx
        .transfer
        .fetch(&desc.url, path, &mut on_progress)
        .map_err(|source| SyncError::Transport {
            url: desc.url.clone(),
            source,
        })?;

    tracing::debug!(id = desc.id, bytes, "validating checksum of downloaded box");
    match checksum::verify(path, &desc.checksum, algorithm) {
        Ok(Verdict::Valid) => Ok(Outcome::Downloaded),
        Ok(Verdict::Invalid { actual }) => {
            remove_rejected(desc.id, path);
            Err(SyncError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: desc.checksum.clone(),
                actual,
            })
        }
        Ok(Verdict::Missing) => Err(SyncError::Filesystem {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "downloaded file disappeared"),
        }),
        Err(e) => {
            remove_rejected(desc.id, path);
            Err(e)
        }
    }
}

/// Delete a downloaded file that failed verification.
fn remove_rejected(id: u64, path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(id, path = %path.display(), error = %e, "could not remove rejected download");
        }
    }
}
