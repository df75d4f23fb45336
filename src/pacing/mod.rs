//! Human-like request pacing.
//!
//! Shapes when and how fast pages are visited: a jittered wait before each
//! navigation, an incremental scroll afterwards to trigger lazy loading, a
//! settle wait before the page is read, and a ceiling on how many sessions a
//! marketplace sees at once.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::config::{DelayRange, PacingConfig, ScrollProfile};

/// What a session is fetching; ceilings differ per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Keyword search pages.
    Discovery,
    /// Product detail pages.
    Detail,
}

/// Draw a delay uniformly from a range.
pub fn sample_delay(range: DelayRange) -> Duration {
    let range = range.normalized();
    if range.min_ms == range.max_ms {
        return Duration::from_millis(range.min_ms);
    }
    let ms = rand::rng().random_range(range.min_ms..=range.max_ms);
    Duration::from_millis(ms)
}

/// A bounded sequence of equal scroll steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPlan {
    pub step_px: u32,
    pub steps: u32,
    pub interval: Duration,
}

impl ScrollPlan {
    /// Steps are taken until the scrolled distance reaches the cap.
    pub fn from_profile(profile: ScrollProfile) -> Self {
        let steps = if profile.step_px == 0 {
            0
        } else {
            profile.max_distance_px.div_ceil(profile.step_px)
        };
        Self {
            step_px: profile.step_px,
            steps,
            interval: Duration::from_millis(profile.interval_ms),
        }
    }

    pub fn total_distance(&self) -> u32 {
        self.step_px.saturating_mul(self.steps)
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }
}

/// Pacing rules for one marketplace.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    config: PacingConfig,
}

impl PacingPolicy {
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// No waits, no scroll, unbounded ceilings. For tests and offline runs.
    pub fn immediate() -> Self {
        let none = DelayRange::new(0, 0);
        Self::new(PacingConfig {
            jitter: none,
            scroll: ScrollProfile::new(0, 0, 0),
            discovery_scroll: ScrollProfile::new(0, 0, 0),
            settle: none,
            cooldown: none,
            discovery_concurrency: usize::MAX,
            detail_concurrency: usize::MAX,
        })
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    pub fn jitter_delay(&self) -> Duration {
        sample_delay(self.config.jitter)
    }

    pub fn settle_delay(&self) -> Duration {
        sample_delay(self.config.settle)
    }

    pub fn cooldown_delay(&self) -> Duration {
        sample_delay(self.config.cooldown)
    }

    pub fn scroll_plan(&self, kind: FetchKind) -> ScrollPlan {
        match kind {
            FetchKind::Discovery => ScrollPlan::from_profile(self.config.discovery_scroll),
            FetchKind::Detail => ScrollPlan::from_profile(self.config.scroll),
        }
    }

    /// Maximum concurrent sessions for a fetch kind (never below 1).
    pub fn concurrency_ceiling(&self, kind: FetchKind) -> usize {
        let ceiling = match kind {
            FetchKind::Discovery => self.config.discovery_concurrency,
            FetchKind::Detail => self.config.detail_concurrency,
        };
        ceiling.max(1)
    }

    /// Requested worker count capped at the ceiling.
    pub fn clamp_workers(&self, kind: FetchKind, requested: usize) -> usize {
        requested.max(1).min(self.concurrency_ceiling(kind))
    }

    /// Wait out the pre-navigation jitter.
    pub async fn before_navigation(&self) {
        let delay = self.jitter_delay();
        debug!("Pacing: waiting {:?} before navigation", delay);
        tokio::time::sleep(delay).await;
    }

    /// Wait for the page to settle after scrolling.
    pub async fn settle(&self) {
        let delay = self.settle_delay();
        debug!("Pacing: settling for {:?}", delay);
        tokio::time::sleep(delay).await;
    }

    /// Rest between items of a sequential run.
    pub async fn cooldown(&self) {
        let delay = self.cooldown_delay();
        debug!("Pacing: cooling down for {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
