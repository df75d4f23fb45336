//! AliExpress item page extraction.
//!
//! Item pages embed their data as `window.runParams = { data: {...} }`.
//! When that blob is missing the record is built from `og:` meta tags.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use serde_json::Value;
use tracing::debug;

use super::options::dedup_by_code;
use super::selectors::aliexpress as sel;
use super::url::normalize_image_url;
use super::{attr_of, first_text, ExtractionError, Extractor};
use crate::browser::RenderedContent;
use crate::models::{OptionRow, Platform, Price, ProductRecord, Ratings, SpecEntry, StoreInfo};

static ITEM_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/item/(\d+)\.html").expect("static regex must compile"));

/// The balanced `{...}` object at the start of `text`.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// The `data` object of `window.runParams`, if the page has one.
pub fn run_params_data(html: &str) -> Option<Value> {
    let start = html.find("window.runParams")?;
    let rest = &html[start..];
    let key_at = [rest.find("data:"), rest.find("\"data\":")]
        .into_iter()
        .flatten()
        .min()?;
    let brace_at = key_at + rest[key_at..].find('{')?;
    let object = balanced_object(&rest[brace_at..])?;

    match serde_json::from_str(object) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("runParams data is not JSON: {}", e);
            None
        }
    }
}

fn str_at(data: &Value, pointer: &str) -> Option<String> {
    match data.pointer(pointer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn f64_at(data: &Value, pointer: &str) -> Option<f64> {
    match data.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Decimal places shown in a display price: `US $12.99` has 2, `₩9,600` has 0.
fn display_decimals(formatted: &str) -> i32 {
    formatted
        .rsplit_once('.')
        .map(|(_, tail)| tail.chars().take_while(char::is_ascii_digit).count())
        .filter(|n| (1..=2).contains(n))
        .map_or(0, |n| n as i32)
}

/// Values are in the display's minor unit so they agree with `Price::from_text`.
fn price_at(data: &Value, formatted: &str, amount: &str) -> Option<Price> {
    let formatted = str_at(data, formatted)?;
    let scale = 10f64.powi(display_decimals(&formatted));
    let value = f64_at(data, amount)
        .map(|v| (v * scale).round().max(0.0) as u64)
        .unwrap_or_else(|| Price::from_text(&formatted).value);
    Some(Price { value, formatted })
}

pub struct AliexpressExtractor;

impl AliexpressExtractor {
    fn identifier(product_id: &str, final_url: &str) -> String {
        let id = product_id.trim();
        if !id.is_empty() {
            return id.to_string();
        }
        ITEM_PATH
            .captures(final_url)
            .map(|c| c[1].to_string())
            .unwrap_or_default()
    }

    fn from_run_params(record: &mut ProductRecord, data: &Value) {
        if let Some(price) = price_at(
            data,
            "/priceModule/formatedActivityPrice",
            "/priceModule/minActivityAmount/value",
        )
        .or_else(|| price_at(data, "/priceModule/formatedPrice", "/priceModule/minAmount/value"))
        {
            record.sale_price = price;
        }
        if let Some(price) =
            price_at(data, "/priceModule/formatedPrice", "/priceModule/minAmount/value")
        {
            record.original_price = price;
        }

        if let Some(images) = data.pointer("/imageModule/imagePathList").and_then(Value::as_array) {
            record.images = images
                .iter()
                .filter_map(Value::as_str)
                .map(normalize_image_url)
                .collect();
        }

        if let Some(props) = data.pointer("/specsModule/props").and_then(Value::as_array) {
            record.specs = props
                .iter()
                .filter_map(|p| {
                    Some(SpecEntry {
                        attr_name: str_at(p, "/attrName")?,
                        attr_value: str_at(p, "/attrValue")?,
                    })
                })
                .collect();
        }

        record.store_info = StoreInfo {
            name: str_at(data, "/storeModule/storeName").unwrap_or_default(),
            rating: f64_at(data, "/storeModule/positiveRate"),
        };
        record.ratings = Ratings {
            average_star: f64_at(data, "/titleModule/feedbackRating/averageStar").unwrap_or(0.0),
            total_count: f64_at(data, "/titleModule/feedbackRating/totalValidNum")
                .map(|n| n as u64)
                .unwrap_or(0),
        };

        if let Some(skus) = data.pointer("/skuModule/skuPriceList").and_then(Value::as_array) {
            let rows = skus.iter().filter_map(|sku| {
                let price = str_at(sku, "/skuVal/skuAmount/formatedAmount")?;
                let real_price =
                    str_at(sku, "/skuVal/skuActivityAmount/formatedAmount").unwrap_or_else(|| price.clone());
                Some(OptionRow {
                    code: str_at(sku, "/skuPropIds").or_else(|| str_at(sku, "/skuId"))?,
                    name: str_at(sku, "/skuAttr").unwrap_or_default(),
                    price,
                    real_price,
                    stock: str_at(sku, "/skuVal/availQuantity").unwrap_or_default(),
                })
            });
            record.options = dedup_by_code(rows);
        }
    }
}

impl Extractor for AliexpressExtractor {
    fn platform(&self) -> Platform {
        Platform::Aliexpress
    }

    fn extract(
        &self,
        product_id: &str,
        content: &RenderedContent,
    ) -> Result<ProductRecord, ExtractionError> {
        let doc = Html::parse_document(content.html());
        let data = run_params_data(content.html());

        let title = data
            .as_ref()
            .and_then(|d| str_at(d, "/titleModule/subject"))
            .or_else(|| {
                doc.select(&sel::OG_TITLE)
                    .next()
                    .and_then(|m| attr_of(m, "content"))
            })
            .unwrap_or_else(|| first_text(&doc, &sel::TITLE_FALLBACK));

        let id = Self::identifier(product_id, &content.page.final_url);
        let mut record = ProductRecord::new(id, title, Platform::Aliexpress);
        super::require_mandatory(&record)?;

        match data {
            Some(data) => Self::from_run_params(&mut record, &data),
            None => {
                debug!("No runParams for {}, using meta tags", record.product_id);
                record.images = doc
                    .select(&sel::OG_IMAGE)
                    .filter_map(|m| attr_of(m, "content"))
                    .map(|src| normalize_image_url(&src))
                    .collect();
            }
        }

        record.source_url = Some(content.page.final_url.clone());
        super::ensure_option(&mut record);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::RenderedPage;
    use serde_json::json;

    const ITEM_PAGE: &str = r#"
        <html><head>
          <meta property="og:title" content="meta title">
          <script>
            window.runParams = {
              data: {
                "titleModule": {"subject": "Wireless Mouse 2.4G {silent}",
                  "feedbackRating": {"averageStar": "4.7", "totalValidNum": 812}},
                "priceModule": {"formatedPrice": "₩12,000", "minAmount": {"value": 12000},
                  "formatedActivityPrice": "₩9,600", "minActivityAmount": {"value": 9600}},
                "imageModule": {"imagePathList": ["//ae01.alicdn.com/kf/a.jpg", "https://ae01.alicdn.com/kf/b.jpg"]},
                "specsModule": {"props": [{"attrName": "Brand Name", "attrValue": "OEM"}]},
                "storeModule": {"storeName": "Mouse Store", "positiveRate": "97.5%"},
                "skuModule": {"skuPriceList": [
                  {"skuPropIds": "14", "skuAttr": "14:193#Black", "skuVal": {"skuAmount": {"formatedAmount": "₩12,000"},
                    "skuActivityAmount": {"formatedAmount": "₩9,600"}, "availQuantity": 40}},
                  {"skuPropIds": "14", "skuAttr": "14:193#Black v2", "skuVal": {"skuAmount": {"formatedAmount": "₩12,500"}, "availQuantity": 3}},
                  {"skuPropIds": "29", "skuAttr": "14:29#White", "skuVal": {"skuAmount": {"formatedAmount": "₩12,000"}, "availQuantity": 0}}
                ]}
              },
              csrfToken: 'abc'
            };
          </script>
        </head><body></body></html>"#;

    fn content(html: &str) -> RenderedContent {
        RenderedContent {
            page: RenderedPage::new("https://www.aliexpress.com/item/1005001234567890.html", html),
            supplements: Vec::new(),
        }
    }

    #[test]
    fn extracts_from_run_params() {
        let record = AliexpressExtractor
            .extract("1005001234567890", &content(ITEM_PAGE))
            .unwrap();

        assert_eq!(record.title, "Wireless Mouse 2.4G {silent}");
        assert_eq!(record.sale_price.value, 9600);
        assert_eq!(record.sale_price.formatted, "₩9,600");
        assert_eq!(record.original_price.value, 12000);
        assert_eq!(record.images[0], "https://ae01.alicdn.com/kf/a.jpg");
        assert_eq!(record.specs[0].attr_value, "OEM");
        assert_eq!(record.store_info.rating, Some(97.5));
        assert_eq!(record.ratings.average_star, 4.7);
        assert_eq!(record.ratings.total_count, 812);

        assert_eq!(record.options.len(), 2);
        assert_eq!(record.options[0].name, "14:193#Black v2");
        assert_eq!(record.options[0].stock, "3");
        assert_eq!(record.options[1].code, "29");
    }

    #[test]
    fn falls_back_to_meta_tags() {
        let html = r#"<html><head>
            <meta property="og:title" content="Mechanical Keyboard">
            <meta property="og:image" content="https://ae01.alicdn.com/kf/k.jpg">
            </head><body></body></html>"#;
        let record = AliexpressExtractor.extract("", &content(html)).unwrap();
        assert_eq!(record.title, "Mechanical Keyboard");
        assert_eq!(record.product_id, "1005001234567890");
        assert_eq!(record.images, vec!["https://ae01.alicdn.com/kf/k.jpg"]);
        // No sku list: one placeholder option
        assert_eq!(record.options.len(), 1);
        assert_eq!(record.options[0].code, "00");
        assert_eq!(record.options[0].name, "(단일옵션) Mechanical Keyboard");
        assert_eq!(record.options[0].price, "N/A");
    }

    #[test]
    fn dollar_prices_keep_cents() {
        let data = json!({"priceModule": {
            "formatedPrice": "US $12.99", "minAmount": {"value": 12.99}
        }});
        let price = price_at(&data, "/priceModule/formatedPrice", "/priceModule/minAmount/value").unwrap();
        assert_eq!(price.value, 1299);
        assert_eq!(price.value, Price::from_text(&price.formatted).value);

        let won = json!({"priceModule": {"formatedPrice": "₩9,600", "minAmount": {"value": 9600}}});
        let price = price_at(&won, "/priceModule/formatedPrice", "/priceModule/minAmount/value").unwrap();
        assert_eq!(price.value, 9600);
    }

    #[test]
    fn balanced_object_skips_braces_in_strings() {
        assert_eq!(
            balanced_object(r#"{"a": "}", "b": {"c": 1}} trailing"#),
            Some(r#"{"a": "}", "b": {"c": 1}}"#)
        );
        assert_eq!(balanced_object("{unclosed"), None);
    }
}
