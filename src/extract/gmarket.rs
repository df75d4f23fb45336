//! Gmarket item page extraction.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;
use scraper::Html;

use super::selectors::gmarket as sel;
use super::url::{normalize_image_url, query_param};
use super::{attr_of, first_text, ExtractionError, Extractor};
use crate::browser::RenderedContent;
use crate::models::{Platform, Price, ProductRecord, Ratings, StoreInfo};

/// Store name used when the page shows none.
pub const UNKNOWN_SELLER: &str = "판매자 정보 없음";

const MAX_IMAGES: usize = 10;

static GROUPED_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(,\d+)*").expect("static regex must compile"));

pub struct GmarketExtractor;

impl GmarketExtractor {
    /// Count from the first element that mentions reviews alongside a number.
    fn review_count(doc: &Html) -> u64 {
        doc.select(&sel::REVIEW_CANDIDATES)
            .map(|el| el.text().collect::<String>())
            .find(|text| {
                (text.contains("리뷰") || text.contains("구매후기"))
                    && text.chars().any(|c| c.is_ascii_digit())
            })
            .and_then(|text| {
                GROUPED_DIGITS
                    .find(&text)
                    .and_then(|m| m.as_str().replace(',', "").parse().ok())
            })
            .unwrap_or(0)
    }

    /// Gallery images upgraded to full size, deduplicated, capped.
    fn images(doc: &Html) -> Vec<String> {
        let main = doc.select(&sel::MAIN_IMAGE).next();
        let viewer = doc.select(&sel::VIEWER_IMAGE).next();
        let thumbs = doc.select(&sel::THUMB_IMAGES);

        let unique: IndexSet<String> = main
            .into_iter()
            .chain(viewer)
            .chain(thumbs)
            .filter_map(|img| attr_of(img, "src"))
            .map(|src| normalize_image_url(&src))
            .filter(|src| !src.contains("clear.gif") && src.starts_with("http"))
            .map(|src| src.replace("/thumbnail/", "/main/").replace("/60/", "/600/"))
            .collect();

        unique.into_iter().take(MAX_IMAGES).collect()
    }

    fn average_star(doc: &Html) -> f64 {
        let score: String = first_text(doc, &sel::SCORE)
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        score.parse().unwrap_or(0.0)
    }
}

impl Extractor for GmarketExtractor {
    fn platform(&self) -> Platform {
        Platform::Gmarket
    }

    fn extract(
        &self,
        product_id: &str,
        content: &RenderedContent,
    ) -> Result<ProductRecord, ExtractionError> {
        let doc = Html::parse_document(content.html());

        let title = Some(first_text(&doc, &sel::TITLE))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| first_text(&doc, &sel::TITLE_FALLBACK));

        let id = query_param(&content.page.final_url, "goodscode")
            .unwrap_or_else(|| product_id.trim().to_string());

        let mut record = ProductRecord::new(id, title, Platform::Gmarket);
        super::require_mandatory(&record)?;

        record.sale_price = Price::from_text(&first_text(&doc, &sel::SALE_PRICE));
        let original = Some(first_text(&doc, &sel::ORIGINAL_PRICE))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| first_text(&doc, &sel::ORIGINAL_PRICE_FALLBACK));
        record.original_price = Price::from_text(&original);

        record.images = Self::images(&doc);

        let seller = [&sel::SELLER, &sel::SELLER_FALLBACK]
            .into_iter()
            .map(|s| first_text(&doc, s))
            .find(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_SELLER.to_string());
        record.store_info = StoreInfo {
            name: seller,
            rating: None,
        };

        record.ratings = Ratings {
            average_star: Self::average_star(&doc),
            total_count: Self::review_count(&doc),
        };
        record.source_url = Some(content.page.final_url.clone());

        super::ensure_option(&mut record);
        Ok(record)
    }
}
