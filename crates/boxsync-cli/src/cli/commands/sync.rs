//! `boxsync sync` – one manifest-driven sync run.

use anyhow::Result;
use boxsync_core::config::SyncConfig;
use boxsync_core::scheduler::ArtifactProgress;
use boxsync_core::sync::run_sync;
use boxsync_core::transfer::CurlTransfer;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

const PROGRESS_INTERVAL_MS: u64 = 500;
const MIB: f64 = 1_048_576.0;

pub async fn run_sync_command(cfg: SyncConfig) -> Result<()> {
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ArtifactProgress>(64);
    let progress_handle = tokio::spawn(async move {
        let mut last_print: HashMap<u64, Instant> = HashMap::new();
        while let Some(event) = progress_rx.recv().await {
            let now = Instant::now();
            let due = last_print
                .get(&event.id)
                .map(|t| now.duration_since(*t).as_millis() as u64 >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            let p = event.progress;
            if due || (p.total_bytes > 0 && p.bytes_done >= p.total_bytes) {
                println!(
                    "[dl/{}] Progress {:.1} / {:.1} MiB ({}%)",
                    event.id,
                    p.bytes_done as f64 / MIB,
                    p.total_bytes as f64 / MIB,
                    p.percent()
                );
                last_print.insert(event.id, now);
            }
        }
    });

    let result = run_sync(&cfg, Arc::new(CurlTransfer::new()), Some(progress_tx)).await;
    let _ = progress_handle.await;
    let report = result?;

    let run = &report.run;
    println!(
        "{} box(es): {} up to date, {} downloaded, {} failed; removed {} obsolete file(s)",
        run.reports.len(),
        run.up_to_date(),
        run.downloaded(),
        run.failed(),
        report.reconcile.deleted.len()
    );

    if !report.is_success(cfg.fail_on_artifact_error) {
        let ids: Vec<String> = run.failures().map(|r| r.id.to_string()).collect();
        anyhow::bail!("{} box(es) failed to sync: {}", ids.len(), ids.join(", "));
    }
    tracing::info!("sync completed");
    Ok(())
}
