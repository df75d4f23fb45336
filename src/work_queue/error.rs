//! Worker pool error types.

use thiserror::Error;

use crate::browser::FetchError;
use crate::extract::ExtractionError;

/// Why one item produced no record. Recorded per item, never propagated to siblings.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Processing panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum WorkQueueError {
    #[error("No identifiers to process")]
    EmptyInput,
    #[error("Worker task failed: {0}")]
    Worker(String),
}
