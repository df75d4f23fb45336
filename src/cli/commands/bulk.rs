//! Bulk scrape command.

use std::path::{Path, PathBuf};

use console::style;

use crate::cli::helpers::{collect_identifiers, page_source, pacing};
use crate::cli::progress::spawn_batch_progress;
use crate::config::Config;
use crate::models::Platform;
use crate::services::{write_results, BulkService};

/// Scrape every identifier and write the outcomes to the output file.
pub async fn cmd_bulk(
    config: &Config,
    platform: Platform,
    args: &[String],
    input: Option<&Path>,
    workers: usize,
    output: Option<PathBuf>,
    show_progress: bool,
) -> anyhow::Result<()> {
    let ids = collect_identifiers(args, input).await?;
    if ids.is_empty() {
        println!(
            "{} No identifiers given; pass them as arguments or with --input",
            style("!").yellow()
        );
        return Ok(());
    }

    let service = BulkService::new(
        page_source(config, platform),
        pacing(config, platform),
        platform,
    );
    let total = ids.len();
    println!(
        "{} Scraping {} {} listings with {} workers",
        style("→").cyan(),
        total,
        platform,
        service.effective_workers(workers).min(total)
    );

    let (event_tx, progress) = spawn_batch_progress(total, show_progress);
    let report = service.run(ids, workers, event_tx).await?;
    if let Err(e) = progress.await {
        tracing::warn!("Progress task failed: {}", e);
    }

    let output = output.unwrap_or_else(|| config.output_file());
    write_results(&report, &output).await?;

    println!(
        "{} {} succeeded, {} failed",
        style("✓").green(),
        report.succeeded,
        report.failed
    );
    for (product_id, error) in report.failures() {
        println!("  {} {}: {}", style("✗").red(), product_id, error);
    }
    println!("  {} Results written to {}", style("→").dim(), output.display());
    Ok(())
}
