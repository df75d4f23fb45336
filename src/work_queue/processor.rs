//! Per-item processing: one fetch session, then extraction.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::ScrapeError;
use crate::browser::{FetchRequest, PageSource};
use crate::extract::extract;
use crate::models::{Platform, ProductRecord};

/// Turns one identifier into a record.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    async fn process(&self, product_id: &str) -> Result<ProductRecord, ScrapeError>;
}

/// Renders the item's detail page (and its supplements) and extracts it.
pub struct FetchExtractProcessor {
    platform: Platform,
    pages: Arc<dyn PageSource>,
}

impl FetchExtractProcessor {
    pub fn new(platform: Platform, pages: Arc<dyn PageSource>) -> Self {
        Self { platform, pages }
    }

    pub fn request_for(&self, product_id: &str) -> FetchRequest {
        FetchRequest::detail(
            self.platform.detail_url(product_id),
            self.platform.supplementary_urls(product_id),
        )
    }
}

#[async_trait]
impl ItemProcessor for FetchExtractProcessor {
    async fn process(&self, product_id: &str) -> Result<ProductRecord, ScrapeError> {
        let request = self.request_for(product_id);
        let content = self.pages.render(&request).await?;
        debug!(
            "Rendered {} ({} bytes, {} supplements)",
            product_id,
            content.html().len(),
            content.supplements.len()
        );
        Ok(extract(self.platform, product_id, &content)?)
    }
}
