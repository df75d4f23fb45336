//! Per-marketplace pacing configuration.

use serde::{Deserialize, Serialize};

use crate::models::Platform;

/// Inclusive millisecond range a delay is drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Range with the bounds in order.
    pub fn normalized(self) -> Self {
        if self.min_ms <= self.max_ms {
            self
        } else {
            Self::new(self.max_ms, self.min_ms)
        }
    }
}

/// Incremental scroll used to trigger lazy-loaded content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrollProfile {
    pub step_px: u32,
    pub interval_ms: u64,
    pub max_distance_px: u32,
}

impl ScrollProfile {
    pub const fn new(step_px: u32, interval_ms: u64, max_distance_px: u32) -> Self {
        Self {
            step_px,
            interval_ms,
            max_distance_px,
        }
    }
}

/// Timing and concurrency rules for one marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay before navigation.
    pub jitter: DelayRange,
    /// Scroll after a detail page renders.
    pub scroll: ScrollProfile,
    /// Scroll after a search page renders.
    pub discovery_scroll: ScrollProfile,
    /// Delay between the scroll and reading the page.
    pub settle: DelayRange,
    /// Rest between consecutive items of a sequential (single worker) run.
    pub cooldown: DelayRange,
    pub discovery_concurrency: usize,
    pub detail_concurrency: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            jitter: DelayRange::new(500, 2000),
            scroll: ScrollProfile::new(100, 100, 500),
            discovery_scroll: ScrollProfile::new(400, 100, 2000),
            settle: DelayRange::new(1000, 2000),
            cooldown: DelayRange::new(2000, 5000),
            discovery_concurrency: 1,
            detail_concurrency: 5,
        }
    }
}

impl PacingConfig {
    /// Built-in defaults for a marketplace.
    pub fn defaults_for(platform: Platform) -> Self {
        match platform {
            Platform::Gmarket => Self::default(),
            // Domeggook serves the option table from a popup; give tabs time to load.
            Platform::Domeggook => Self {
                settle: DelayRange::new(2000, 2000),
                ..Self::default()
            },
            Platform::Aliexpress => Self {
                scroll: ScrollProfile::new(400, 100, 2000),
                ..Self::default()
            },
        }
    }

    /// Apply environment variable overrides.
    ///
    /// - `MSCOUT_DETAIL_CONCURRENCY` - Worker ceiling for detail fetches
    /// - `MSCOUT_DISCOVERY_CONCURRENCY` - Worker ceiling for search pages
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_usize("MSCOUT_DETAIL_CONCURRENCY") {
            self.detail_concurrency = n;
        }
        if let Some(n) = env_usize("MSCOUT_DISCOVERY_CONCURRENCY") {
            self.discovery_concurrency = n;
        }
        self
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_safe_profile() {
        let config = PacingConfig::default();
        assert_eq!(config.jitter, DelayRange::new(500, 2000));
        assert_eq!(config.discovery_concurrency, 1);
        assert_eq!(config.detail_concurrency, 5);
    }

    #[test]
    fn platform_defaults_differ_where_needed() {
        assert_eq!(
            PacingConfig::defaults_for(Platform::Aliexpress).scroll.max_distance_px,
            2000
        );
        assert_eq!(
            PacingConfig::defaults_for(Platform::Domeggook).settle,
            DelayRange::new(2000, 2000)
        );
    }

    #[test]
    fn normalized_swaps_inverted_bounds() {
        assert_eq!(DelayRange::new(9, 3).normalized(), DelayRange::new(3, 9));
    }

    #[test]
    fn partial_pacing_keeps_defaults() {
        let config: PacingConfig = toml::from_str("detail_concurrency = 3").unwrap();
        assert_eq!(config.detail_concurrency, 3);
        assert_eq!(config.settle, PacingConfig::default().settle);
    }

    #[test]
    fn pacing_parses_from_toml() {
        let toml_src = r#"
            jitter = { min_ms = 100, max_ms = 200 }
            scroll = { step_px = 50, interval_ms = 10, max_distance_px = 150 }
            discovery_scroll = { step_px = 400, interval_ms = 100, max_distance_px = 2000 }
            settle = { min_ms = 0, max_ms = 0 }
            cooldown = { min_ms = 0, max_ms = 0 }
            discovery_concurrency = 1
            detail_concurrency = 2
        "#;
        let config: PacingConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.detail_concurrency, 2);
        assert_eq!(config.scroll.step_px, 50);
    }
}
