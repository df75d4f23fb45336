//! Persisted market-intelligence models.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Platform, ProductIdentifier};

/// Daily price/review snapshot for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub price: u64,
    pub reviews: u64,
}

/// A listing first seen through keyword discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProduct {
    pub product_id: ProductIdentifier,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub keyword: String,
    pub platform: Platform,
}

/// One candidate in a keyword insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightPick {
    pub id: ProductIdentifier,
    pub title: String,
    pub price: u64,
    #[serde(default)]
    pub image: Option<String>,
}

/// Aggregate over the most recent discovery batch for a keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordInsight {
    pub lowest_price: u64,
    pub item_count: usize,
    pub updated_at: DateTime<Utc>,
    pub top3: Vec<InsightPick>,
}

/// The whole persisted store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDocument {
    pub keywords: Vec<String>,
    pub tracked_products: Vec<TrackedProduct>,
    pub history: BTreeMap<ProductIdentifier, Vec<HistoryEntry>>,
    pub insights: BTreeMap<String, KeywordInsight>,
    /// Top-level keys this version does not know, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for MarketDocument {
    fn default() -> Self {
        Self {
            keywords: vec!["wireless mouse".to_string(), "mechanical keyboard".to_string()],
            tracked_products: Vec::new(),
            history: BTreeMap::new(),
            insights: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}
