//! Keyword and insight commands.

use console::style;

use crate::cli::helpers::{repository, truncate};
use crate::config::Config;
use crate::repository::{transaction, MarketRepository};

pub async fn cmd_keyword_add(config: &Config, keyword: &str) -> anyhow::Result<()> {
    let repo = repository(config);
    if transaction(repo.as_ref(), |doc| doc.add_keyword(keyword)).await? {
        println!("{} Added keyword '{}'", style("✓").green(), keyword.trim());
    } else {
        println!("{} Keyword '{}' already tracked", style("!").yellow(), keyword.trim());
    }
    Ok(())
}

pub async fn cmd_keyword_remove(config: &Config, keyword: &str) -> anyhow::Result<()> {
    let repo = repository(config);
    if transaction(repo.as_ref(), |doc| doc.remove_keyword(keyword)).await? {
        println!("{} Removed keyword '{}'", style("✓").green(), keyword.trim());
    } else {
        println!("{} Keyword '{}' not found", style("!").yellow(), keyword.trim());
    }
    Ok(())
}

pub async fn cmd_keyword_list(config: &Config) -> anyhow::Result<()> {
    let doc = repository(config).load().await?;
    if doc.keywords.is_empty() {
        println!("{} No keywords", style("!").yellow());
        return Ok(());
    }
    for keyword in &doc.keywords {
        println!("{}", keyword);
    }
    Ok(())
}

/// Print stored insights, optionally for one keyword.
pub async fn cmd_insights(config: &Config, keyword: Option<&str>) -> anyhow::Result<()> {
    let doc = repository(config).load().await?;
    let insights: Vec<_> = doc
        .insights
        .iter()
        .filter(|(k, _)| keyword.is_none_or(|want| want == k.as_str()))
        .collect();

    if insights.is_empty() {
        println!("{} No insights yet; run 'mscout autopilot'", style("!").yellow());
        return Ok(());
    }

    for (keyword, insight) in insights {
        println!(
            "{} {} ({} items, lowest {}원, updated {})",
            style("●").cyan(),
            style(keyword).bold(),
            insight.item_count,
            insight.lowest_price,
            insight.updated_at.format("%Y-%m-%d %H:%M")
        );
        for (rank, pick) in insight.top3.iter().enumerate() {
            println!(
                "  {}. {:>10}원  {}  {}",
                rank + 1,
                pick.price,
                style(&pick.id).dim(),
                truncate(&pick.title, 50)
            );
        }
    }
    Ok(())
}
