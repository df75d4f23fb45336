//! Gmarket keyword search.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use serde_json::Value;
use tracing::debug;

use super::super::DiscoverySource;
use crate::extract::selectors::gmarket_search as sel;
use crate::models::Platform;

/// Keys in the page state that carry item identifiers.
const ID_KEYS: [&str; 3] = ["itemNo", "goodscode", "goodsCode"];

static GOODSCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"goodscode=(\d+)").expect("static regex must compile"));

pub struct GmarketSearch;

/// Depth-first walk collecting identifier values in document order.
fn collect_ids(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_ids(v, out)),
        Value::Object(map) => {
            for (key, v) in map {
                if ID_KEYS.contains(&key.as_str()) {
                    match v {
                        Value::String(s) if !s.is_empty() => out.push(s.clone()),
                        Value::Number(n) if n.as_f64() != Some(0.0) => out.push(n.to_string()),
                        _ => {}
                    }
                } else {
                    collect_ids(v, out);
                }
            }
        }
        _ => {}
    }
}

impl DiscoverySource for GmarketSearch {
    fn platform(&self) -> Platform {
        Platform::Gmarket
    }

    fn search_url(&self, keyword: &str) -> Option<String> {
        Some(format!(
            "https://www.gmarket.co.kr/n/search?keyword={}",
            urlencoding::encode(keyword)
        ))
    }

    /// Page state first, then result links.
    fn parse_ids(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        let mut ids = Vec::new();

        if let Some(script) = doc.select(&sel::NEXT_DATA).next() {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(&raw) {
                Ok(state) => collect_ids(&state, &mut ids),
                Err(e) => debug!("Unreadable __NEXT_DATA__: {}", e),
            }
        }

        ids.extend(
            doc.select(&sel::ITEM_LINKS)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| GOODSCODE.captures(href).map(|c| c[1].to_string())),
        );
        ids
    }
}
