//! Service layer for marketscout.
//!
//! Domain workflows kept apart from the CLI so they can be driven by tests
//! or other front ends.

pub mod bulk;
pub mod market;

pub use bulk::{write_results, BulkService};
pub use market::{CycleReport, KeywordSummary, MarketConfig, MarketService};
