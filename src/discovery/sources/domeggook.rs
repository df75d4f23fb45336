//! Domeggook category listings.
//!
//! Keyword search on domeggook expects EUC-KR encoded queries, which this
//! source does not produce; only category and front listings are supported.

use indexmap::IndexMap;
use scraper::Html;
use serde::{Deserialize, Serialize};

use super::super::DiscoverySource;
use crate::extract::selectors::domeggook as sel;
use crate::extract::url::normalize_image_url;
use crate::models::Platform;

/// One row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub product_id: String,
    pub title: String,
    pub thumbnail: String,
    pub price: String,
    pub url: String,
}

pub struct DomeggookListing;

impl DomeggookListing {
    /// Listing page URL, optionally narrowed to a category.
    pub fn list_url(category: Option<&str>, page: u32) -> String {
        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(ca) => format!(
                "https://domeggook.com/main/item/itemList.php?ca={}&page={}",
                urlencoding::encode(ca),
                page
            ),
            None => format!("https://domeggook.com/main/item/itemList.php?page={}", page),
        }
    }

    /// Rows with both a thumbnail and a title link, deduplicated by id (last wins).
    pub fn parse_listing(html: &str) -> Vec<ListingSummary> {
        let doc = Html::parse_document(html);
        let mut by_id: IndexMap<String, ListingSummary> = IndexMap::new();

        for row in doc.select(&sel::LIST_ROWS) {
            let thumb = row.select(&sel::LIST_THUMB).next();
            let title = row.select(&sel::LIST_TITLE).next();
            let (Some(thumb), Some(title)) = (thumb, title) else {
                continue;
            };
            let product_id = row
                .value()
                .id()
                .unwrap_or_default()
                .replacen("li", "", 1);
            if product_id.is_empty() {
                continue;
            }
            let price = row
                .select(&sel::LIST_AMOUNT)
                .next()
                .map(|b| b.text().collect::<String>().trim().to_string())
                .unwrap_or_else(|| "N/A".to_string());

            by_id.insert(
                product_id.clone(),
                ListingSummary {
                    url: Platform::Domeggook.detail_url(&product_id),
                    title: title.text().collect::<String>().trim().to_string(),
                    thumbnail: normalize_image_url(thumb.value().attr("src").unwrap_or_default()),
                    price,
                    product_id,
                },
            );
        }
        by_id.into_values().collect()
    }
}

impl DiscoverySource for DomeggookListing {
    fn platform(&self) -> Platform {
        Platform::Domeggook
    }

    fn search_url(&self, _keyword: &str) -> Option<String> {
        None
    }

    fn parse_ids(&self, html: &str) -> Vec<String> {
        Self::parse_listing(html)
            .into_iter()
            .map(|s| s.product_id)
            .collect()
    }
}
