//! Bounded-concurrency orchestration over a whole manifest.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinSet;

use crate::manifest::Catalog;
use crate::transfer::Transfer;

use super::outcome::{ArtifactProgress, RunReport};
use super::pool::PermitPool;
use super::touched::TouchedSet;
use super::unit::{process_artifact, UnitContext};

/// Runs every manifest entry through validate/download with at most
/// `concurrency` entries in flight.
pub struct Orchestrator {
    target_dir: PathBuf,
    transfer: Arc<dyn Transfer>,
    pool: PermitPool,
}

impl Orchestrator {
    pub fn new(target_dir: impl Into<PathBuf>, transfer: Arc<dyn Transfer>, concurrency: usize) -> Self {
        Self {
            target_dir: target_dir.into(),
            transfer,
            pool: PermitPool::new(concurrency),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn pool(&self) -> &PermitPool {
        &self.pool
    }

    /// Process all of `catalog` and return once every unit has finished.
    ///
    /// Dispatch waits for a free permit before spawning each unit. After the
    /// last dispatch the whole pool is re-acquired; that succeeds only when
    /// every unit has released its permit, so the returned touched set is final.
    pub async fn run(
        &self,
        catalog: Catalog,
        progress_tx: Option<Sender<ArtifactProgress>>,
    ) -> RunReport {
        self.pool.reset_peak();
        let total = catalog.len();
        let touched = TouchedSet::new();
        let ctx = Arc::new(UnitContext {
            target_dir: self.target_dir.clone(),
            touched: touched.clone(),
            transfer: Arc::clone(&self.transfer),
            progress_tx,
        });

        let mut units = JoinSet::new();
        for desc in catalog {
            let permit = self.pool.acquire().await;
            let ctx = Arc::clone(&ctx);
            units.spawn_blocking(move || {
                let _permit = permit;
                process_artifact(&ctx, &desc)
            });
        }

        tracing::debug!(concurrency = self.pool.capacity(), "waiting for running downloads");
        let barrier = self.pool.drain().await;
        tracing::debug!("all download units finished");

        let mut reports = Vec::with_capacity(total);
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("download unit aborted: {}", e),
            }
        }
        drop(barrier);
        drop(ctx);

        RunReport {
            reports,
            touched: touched.freeze(),
            peak_in_flight: self.pool.peak(),
        }
    }
}
