//! Bulk scraping of a fixed identifier list.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::browser::PageSource;
use crate::models::Platform;
use crate::pacing::{FetchKind, PacingPolicy};
use crate::work_queue::{BatchEvent, BatchReport, FetchExtractProcessor, WorkerPool};

/// Scrapes identifiers on one marketplace.
pub struct BulkService {
    pages: Arc<dyn PageSource>,
    pacing: PacingPolicy,
    platform: Platform,
}

impl BulkService {
    pub fn new(pages: Arc<dyn PageSource>, pacing: PacingPolicy, platform: Platform) -> Self {
        Self {
            pages,
            pacing,
            platform,
        }
    }

    /// Worker count actually used for a request.
    pub fn effective_workers(&self, requested: usize) -> usize {
        self.pacing.clamp_workers(FetchKind::Detail, requested)
    }

    /// One outcome per identifier.
    pub async fn run(
        &self,
        ids: Vec<String>,
        workers: usize,
        event_tx: mpsc::Sender<BatchEvent>,
    ) -> anyhow::Result<BatchReport> {
        let processor = Arc::new(FetchExtractProcessor::new(self.platform, self.pages.clone()));
        let pool = WorkerPool::new(processor, self.effective_workers(workers))
            .with_cooldown(self.pacing.clone());
        Ok(pool.run(ids, event_tx).await?)
    }
}

/// Write outcomes as a pretty JSON array.
pub async fn write_results(report: &BatchReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&report.outcomes)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, json).await?;
    info!("Wrote {} outcomes to {}", report.total(), path.display());
    Ok(())
}
