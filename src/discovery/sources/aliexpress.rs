//! AliExpress keyword search.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use super::super::DiscoverySource;
use crate::extract::selectors::aliexpress as sel;
use crate::models::Platform;

static ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/item/(\d+)\.html").expect("static regex must compile"));

pub struct AliexpressSearch;

impl DiscoverySource for AliexpressSearch {
    fn platform(&self) -> Platform {
        Platform::Aliexpress
    }

    fn search_url(&self, keyword: &str) -> Option<String> {
        Some(format!(
            "https://www.aliexpress.com/w/wholesale-{}.html",
            urlencoding::encode(keyword)
        ))
    }

    fn parse_ids(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        doc.select(&sel::ITEM_LINKS)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| ITEM_ID.captures(href).map(|c| c[1].to_string()))
            .collect()
    }
}
