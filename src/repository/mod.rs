//! Repository layer for the market store.
//!
//! The store is a single JSON document (keywords, tracked products, price
//! history and keyword insights). Backends load and save it whole; callers
//! mutate it in between with `transaction`.

mod json_file;
mod market;

pub use json_file::JsonFileRepository;
pub use market::{compute_insight, today, TOP_PICKS};

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::MarketDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The persisted document could not be read back.
    #[error("Store {path} is corrupt: {reason}")]
    Corruption { path: PathBuf, reason: String },

    #[error("Store task failed: {0}")]
    Task(String),
}

/// Persistence for the market document.
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// Current document; defaults when nothing is stored yet.
    async fn load(&self) -> Result<MarketDocument, StoreError>;

    /// Replace the stored document.
    async fn save(&self, doc: &MarketDocument) -> Result<(), StoreError>;
}

/// Load, mutate, save. The closure's return value is passed through.
pub async fn transaction<T>(
    repo: &dyn MarketRepository,
    mutate: impl FnOnce(&mut MarketDocument) -> T + Send,
) -> Result<T, StoreError> {
    let mut doc = repo.load().await?;
    let out = mutate(&mut doc);
    repo.save(&doc).await?;
    Ok(out)
}

/// Overlay a stored document on the defaults, key by key at the top level.
pub fn merge_over_defaults(contents: &str) -> Result<MarketDocument, serde_json::Error> {
    let existing: Value = serde_json::from_str(contents)?;
    let mut merged = serde_json::to_value(MarketDocument::default())?;

    match (&mut merged, existing) {
        (Value::Object(base), Value::Object(stored)) => base.extend(stored),
        _ => {
            return Err(serde::de::Error::custom(
                "store root must be a JSON object",
            ))
        }
    }
    serde_json::from_value(merged)
}
