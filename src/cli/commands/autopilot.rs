//! One discovery-and-analysis cycle.

use console::style;

use crate::cli::helpers::{page_source, pacing, repository};
use crate::cli::progress::spawn_batch_progress;
use crate::config::Config;
use crate::models::Platform;
use crate::services::{MarketConfig, MarketService};

pub async fn cmd_autopilot(
    config: &Config,
    platform: Platform,
    workers: usize,
    show_progress: bool,
) -> anyhow::Result<()> {
    let service = MarketService::new(
        repository(config),
        page_source(config, platform),
        pacing(config, platform),
        MarketConfig {
            platform,
            discovery_limit: config.discovery_limit(),
            workers,
        },
    );

    println!(
        "{} Running market cycle on {} (store: {})",
        style("→").cyan(),
        platform,
        config.store_path().display()
    );

    let (event_tx, progress) = spawn_batch_progress(0, show_progress);
    let report = service.run_cycle(event_tx).await?;
    if let Err(e) = progress.await {
        tracing::warn!("Progress task failed: {}", e);
    }

    for summary in &report.keywords {
        match &summary.insight {
            Some(insight) => println!(
                "{} {}: {} scraped, {} failed, lowest {}원, {} new",
                style("✓").green(),
                summary.keyword,
                summary.succeeded,
                summary.failed,
                insight.lowest_price,
                summary.newly_tracked
            ),
            None => println!(
                "{} {}: nothing scraped ({} discovered, {} failed)",
                style("!").yellow(),
                summary.keyword,
                summary.discovered,
                summary.failed
            ),
        }
    }
    println!(
        "  {} {} listings discovered across {} keywords",
        style("→").dim(),
        report.discovered(),
        report.keywords.len()
    );
    Ok(())
}
