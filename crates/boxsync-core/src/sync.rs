//! One complete sync run: manifest → orchestration → reconciliation.

use std::fs;
use std::sync::Arc;

use tokio::sync::mpsc::Sender;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::manifest;
use crate::reconcile::{self, ReconcileSummary};
use crate::scheduler::{ArtifactProgress, Orchestrator, RunReport};
use crate::transfer::Transfer;

/// Result of a run that reached reconciliation.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub run: RunReport,
    pub reconcile: ReconcileSummary,
}

impl SyncReport {
    /// Whether the run counts as successful. Per-box failures only count
    /// when `strict` is set; fatal errors never produce a report at all.
    pub fn is_success(&self, strict: bool) -> bool {
        !(strict && self.run.has_failures())
    }
}

/// Synchronize `cfg.target_dir` with the manifest at `cfg.manifest_url`.
///
/// Fatal errors (invalid config, manifest fetch/parse, target dir creation,
/// aggregated deletion failures) are returned as `Err`. Per-box failures are
/// reported in `SyncReport::run` only.
pub async fn run_sync(
    cfg: &SyncConfig,
    transfer: Arc<dyn Transfer>,
    progress_tx: Option<Sender<ArtifactProgress>>,
) -> SyncResult<SyncReport> {
    cfg.validate()?;
    let target_dir = cfg.target_dir.clone();
    tracing::info!(url = %cfg.manifest_url, "downloading available boxes");
    tracing::info!(dir = %target_dir.display(), "storing boxes");

    let catalog = {
        let transfer = Arc::clone(&transfer);
        let url = cfg.manifest_url.trim().to_string();
        tokio::task::spawn_blocking(move || manifest::fetch(&url, transfer.as_ref())).await??
    };

    tracing::debug!(dir = %target_dir.display(), "creating output directory");
    fs::create_dir_all(&target_dir).map_err(|source| SyncError::Filesystem {
        path: target_dir.clone(),
        source,
    })?;

    let orchestrator = Orchestrator::new(target_dir.clone(), transfer, cfg.effective_concurrency());
    let run = orchestrator.run(catalog, progress_tx).await;
    if run.has_failures() {
        let ids: Vec<u64> = run.failures().map(|r| r.id).collect();
        tracing::warn!(failed = ids.len(), ?ids, "some boxes could not be synced");
    }

    let reconcile = reconcile::reconcile(&target_dir, &run.touched)?;
    Ok(SyncReport { run, reconcile })
}
