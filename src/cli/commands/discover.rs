//! Discovery commands.

use console::style;

use crate::cli::helpers::page_source;
use crate::config::Config;
use crate::discovery::Discovery;
use crate::models::Platform;

/// Search for a keyword and print the identifiers found.
pub async fn cmd_discover(
    config: &Config,
    platform: Platform,
    keyword: &str,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or_else(|| config.discovery_limit());
    let discovery = Discovery::new(page_source(config, platform));
    let ids = discovery.search(platform, keyword, limit).await?;

    if ids.is_empty() {
        println!("{} No listings found for '{}'", style("!").yellow(), keyword);
        return Ok(());
    }
    println!(
        "{} {} listings for '{}' on {}",
        style("✓").green(),
        ids.len(),
        keyword,
        platform
    );
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

/// Print one page of a domeggook category listing.
pub async fn cmd_listing(config: &Config, category: Option<&str>, page: u32) -> anyhow::Result<()> {
    let discovery = Discovery::new(page_source(config, Platform::Domeggook));
    let rows = discovery.list_category(category, page).await;

    if rows.is_empty() {
        println!("{} Listing page {} is empty", style("!").yellow(), page);
        return Ok(());
    }
    for row in rows {
        println!(
            "{:<12} {:>12}  {}",
            style(&row.product_id).cyan(),
            row.price,
            row.title
        );
    }
    Ok(())
}
