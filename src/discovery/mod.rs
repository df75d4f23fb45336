//! Keyword discovery.
//!
//! Renders a marketplace search page and returns the item identifiers on it,
//! in page order, deduplicated and truncated. Discovery never fails the
//! caller: a blocked or broken search yields an empty list.

pub mod sources;

pub use sources::{source_for, ListingSummary};

use std::sync::Arc;

use indexmap::IndexSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::{FetchError, FetchRequest, PageSource};
use crate::models::Platform;
use sources::DomeggookListing;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Keyword search is not supported on {0}")]
    Unsupported(Platform),
}

/// A marketplace search page.
pub trait DiscoverySource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Search page for a keyword; `None` when the marketplace cannot be searched.
    fn search_url(&self, keyword: &str) -> Option<String>;

    /// Identifiers in page order, duplicates included.
    fn parse_ids(&self, html: &str) -> Vec<String>;
}

/// Order-preserving dedup; blank ids dropped.
pub fn dedup_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Runs searches through a page source.
pub struct Discovery {
    pages: Arc<dyn PageSource>,
}

impl Discovery {
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        Self { pages }
    }

    /// Search, surfacing failures.
    pub async fn search(
        &self,
        platform: Platform,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<String>, DiscoveryError> {
        let source = source_for(platform);
        let url = source
            .search_url(keyword)
            .ok_or(DiscoveryError::Unsupported(platform))?;

        info!("Searching {} for '{}'", platform, keyword);
        let content = self.pages.render(&FetchRequest::discovery(url)).await?;

        let mut ids = dedup_ids(source.parse_ids(content.html()));
        debug!("Found {} ids for '{}'", ids.len(), keyword);
        ids.truncate(max_results);
        Ok(ids)
    }

    /// Search, degrading to an empty list on any failure.
    pub async fn discover(&self, platform: Platform, keyword: &str, max_results: usize) -> Vec<String> {
        match self.search(platform, keyword, max_results).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Discovery for '{}' on {} failed: {}", keyword, platform, e);
                Vec::new()
            }
        }
    }

    /// Domeggook listing page rows; empty on failure.
    pub async fn list_category(&self, category: Option<&str>, page: u32) -> Vec<ListingSummary> {
        let url = DomeggookListing::list_url(category, page);
        match self.pages.render(&FetchRequest::discovery(url.clone())).await {
            Ok(content) => DomeggookListing::parse_listing(content.html()),
            Err(e) => {
                warn!("Listing {} failed: {}", url, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{RenderedContent, RenderedPage};
    use crate::pacing::FetchKind;
    use async_trait::async_trait;

    struct CannedSearch(&'static str);

    #[async_trait]
    impl PageSource for CannedSearch {
        async fn render(&self, request: &FetchRequest) -> Result<RenderedContent, FetchError> {
            assert_eq!(request.kind, FetchKind::Discovery);
            Ok(RenderedContent {
                page: RenderedPage::new(request.url.clone(), self.0),
                supplements: Vec::new(),
            })
        }
    }

    struct Blocked;

    #[async_trait]
    impl PageSource for Blocked {
        async fn render(&self, request: &FetchRequest) -> Result<RenderedContent, FetchError> {
            Err(FetchError::blocked(&request.url, "challenge page"))
        }
    }

    const RESULTS: &str = r#"
        <a href="/item/11.html"></a><a href="/item/12.html"></a>
        <a href="/item/11.html"></a><a href="/item/13.html"></a>"#;

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let ids = dedup_ids(["b", "a", "b", " ", "c", "a"].map(String::from));
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn discover_dedups_and_truncates() {
        let discovery = Discovery::new(Arc::new(CannedSearch(RESULTS)));
        let ids = discovery.discover(Platform::Aliexpress, "mouse", 2).await;
        assert_eq!(ids, vec!["11", "12"]);

        let ids = discovery.discover(Platform::Aliexpress, "mouse", 50).await;
        assert_eq!(ids, vec!["11", "12", "13"]);
    }

    #[tokio::test]
    async fn blocked_search_yields_empty() {
        let discovery = Discovery::new(Arc::new(Blocked));
        assert!(discovery.discover(Platform::Gmarket, "mouse", 5).await.is_empty());
        assert!(matches!(
            discovery.search(Platform::Gmarket, "mouse", 5).await,
            Err(DiscoveryError::Fetch(FetchError::NavigationBlocked { .. }))
        ));
    }

    #[tokio::test]
    async fn domeggook_keyword_search_is_unsupported() {
        let discovery = Discovery::new(Arc::new(CannedSearch(RESULTS)));
        assert!(matches!(
            discovery.search(Platform::Domeggook, "텀블러", 5).await,
            Err(DiscoveryError::Unsupported(Platform::Domeggook))
        ));
        assert!(discovery.discover(Platform::Domeggook, "텀블러", 5).await.is_empty());
    }
}
