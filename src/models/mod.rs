//! Data models for marketscout.

mod market;
mod platform;
mod product;

pub use market::{HistoryEntry, InsightPick, KeywordInsight, MarketDocument, TrackedProduct};
pub use platform::Platform;
pub use product::{
    ItemOutcome, LabeledValue, OptionRow, Price, PriceTier, ProductIdentifier, ProductRecord,
    Ratings, SpecEntry, StoreInfo,
};
