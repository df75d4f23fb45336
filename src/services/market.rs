//! Discovery-and-analysis cycle over the stored keywords.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;

use crate::browser::PageSource;
use crate::discovery::Discovery;
use crate::models::{ItemOutcome, KeywordInsight, Platform, ProductRecord, TrackedProduct};
use crate::pacing::{FetchKind, PacingPolicy};
use crate::repository::{today, transaction, MarketRepository};
use crate::work_queue::{BatchEvent, FetchExtractProcessor, WorkerPool};

/// What one keyword contributed to a cycle.
#[derive(Debug, Clone)]
pub struct KeywordSummary {
    pub keyword: String,
    pub discovered: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub newly_tracked: usize,
    pub insight: Option<KeywordInsight>,
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub keywords: Vec<KeywordSummary>,
}

impl CycleReport {
    pub fn discovered(&self) -> usize {
        self.keywords.iter().map(|k| k.discovered).sum()
    }
}

/// Settings for the cycle.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub platform: Platform,
    /// Listings kept per keyword.
    pub discovery_limit: usize,
    /// Requested detail workers, clamped by pacing.
    pub workers: usize,
}

/// Discovers listings per keyword, scrapes them and folds the results into the store.
pub struct MarketService {
    repo: Arc<dyn MarketRepository>,
    pages: Arc<dyn PageSource>,
    pacing: PacingPolicy,
    config: MarketConfig,
}

impl MarketService {
    pub fn new(
        repo: Arc<dyn MarketRepository>,
        pages: Arc<dyn PageSource>,
        pacing: PacingPolicy,
        config: MarketConfig,
    ) -> Self {
        Self {
            repo,
            pages,
            pacing,
            config,
        }
    }

    /// One pass over every stored keyword, in order.
    pub async fn run_cycle(
        &self,
        event_tx: mpsc::Sender<BatchEvent>,
    ) -> anyhow::Result<CycleReport> {
        let keywords = self.repo.load().await?.keywords;
        info!("Starting market cycle over {} keywords", keywords.len());

        let mut report = CycleReport::default();
        for keyword in keywords {
            let summary = self.run_keyword(&keyword, event_tx.clone()).await?;
            report.keywords.push(summary);
        }
        Ok(report)
    }

    /// Discover, scrape and record a single keyword.
    pub async fn run_keyword(
        &self,
        keyword: &str,
        event_tx: mpsc::Sender<BatchEvent>,
    ) -> anyhow::Result<KeywordSummary> {
        let platform = self.config.platform;
        let ids = Discovery::new(self.pages.clone())
            .discover(platform, keyword, self.config.discovery_limit)
            .await;

        let mut summary = KeywordSummary {
            keyword: keyword.to_string(),
            discovered: ids.len(),
            succeeded: 0,
            failed: 0,
            newly_tracked: 0,
            insight: None,
        };
        if ids.is_empty() {
            info!("Nothing discovered for '{}'", keyword);
            return Ok(summary);
        }

        let workers = self.pacing.clamp_workers(FetchKind::Detail, self.config.workers);
        let processor = Arc::new(FetchExtractProcessor::new(platform, self.pages.clone()));
        let batch = WorkerPool::new(processor, workers)
            .with_cooldown(self.pacing.clone())
            .run(ids, event_tx)
            .await?;

        summary.succeeded = batch.succeeded;
        summary.failed = batch.failed;

        let records: Vec<ProductRecord> = batch
            .outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Success(record) => Some(*record),
                ItemOutcome::Failure { .. } => None,
            })
            .collect();

        let date = today();
        let now = Utc::now();
        let (newly_tracked, insight) = transaction(self.repo.as_ref(), |doc| {
            let mut added = 0;
            for record in &records {
                let tracked = TrackedProduct {
                    product_id: record.product_id.clone(),
                    title: record.title.clone(),
                    image: record.thumbnail().map(str::to_string),
                    keyword: keyword.to_string(),
                    platform,
                };
                if doc.upsert_tracked(tracked) {
                    added += 1;
                }
                doc.record_snapshot(record, date);
            }
            let insight = doc.record_insight(keyword, &records, now).cloned();
            (added, insight)
        })
        .await?;

        info!(
            "Keyword '{}': {} scraped, {} failed, {} newly tracked",
            keyword, summary.succeeded, summary.failed, newly_tracked
        );
        summary.newly_tracked = newly_tracked;
        summary.insight = insight;
        Ok(summary)
    }
}
