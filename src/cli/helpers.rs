//! Shared helpers for CLI commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::browser::{ChromeSessionSource, PageSource};
use crate::config::Config;
use crate::models::Platform;
use crate::pacing::PacingPolicy;
use crate::repository::JsonFileRepository;
use crate::work_queue::parse_identifiers;

/// Truncate to `max_chars` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}

pub fn pacing(config: &Config, platform: Platform) -> PacingPolicy {
    PacingPolicy::new(config.pacing_for(platform))
}

/// Browser-backed page source for a marketplace.
pub fn page_source(config: &Config, platform: Platform) -> Arc<dyn PageSource> {
    Arc::new(ChromeSessionSource::new(
        config.browser.clone(),
        pacing(config, platform),
    ))
}

pub fn repository(config: &Config) -> Arc<JsonFileRepository> {
    Arc::new(JsonFileRepository::new(config.store_path()))
}

/// Identifiers from positional arguments, then from the input file.
pub async fn collect_identifiers(args: &[String], input: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut ids: Vec<String> = args
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if let Some(path) = input {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read identifiers from {}", path.display()))?;
        ids.extend(parse_identifiers(&contents));
    }
    Ok(ids)
}
