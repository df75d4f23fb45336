//! Marketplace extractors: rendered content to `ProductRecord`.
//!
//! Extraction is pure and synchronous. Every marketplace produces the same
//! record shape; only the selectors differ. Optional fields that are absent
//! on the page come back empty, while a page without a title or identifier
//! is an `ExtractionError`.

pub mod aliexpress;
pub mod domeggook;
pub mod gmarket;
pub mod options;
pub mod price;
pub mod selectors;
pub mod url;

pub use aliexpress::AliexpressExtractor;
pub use domeggook::DomeggookExtractor;
pub use gmarket::GmarketExtractor;
pub use price::MalformedOptionRow;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::browser::RenderedContent;
use crate::models::{Platform, ProductRecord};

/// A rendered page that cannot become a record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No product title found for {product_id}")]
    MissingTitle { product_id: String },

    #[error("No product identifier found")]
    MissingIdentifier,
}

/// Turns a marketplace's rendered pages into a record.
pub trait Extractor: Send + Sync {
    fn platform(&self) -> Platform;

    fn extract(
        &self,
        product_id: &str,
        content: &RenderedContent,
    ) -> Result<ProductRecord, ExtractionError>;
}

/// Extractor for a marketplace.
pub fn extractor_for(platform: Platform) -> &'static dyn Extractor {
    match platform {
        Platform::Gmarket => &GmarketExtractor,
        Platform::Domeggook => &DomeggookExtractor,
        Platform::Aliexpress => &AliexpressExtractor,
    }
}

/// Extract a record with the marketplace's extractor.
pub fn extract(
    platform: Platform,
    product_id: &str,
    content: &RenderedContent,
) -> Result<ProductRecord, ExtractionError> {
    let mut record = extractor_for(platform).extract(product_id, content)?;
    ensure_option(&mut record);
    Ok(record)
}

/// Give a record without option rows the single placeholder option, priced
/// at the displayed sale price.
pub(crate) fn ensure_option(record: &mut ProductRecord) {
    if !record.options.is_empty() {
        return;
    }
    let price = Some(record.sale_price.formatted.as_str())
        .filter(|p| !p.is_empty())
        .unwrap_or(options::NOT_AVAILABLE)
        .to_string();
    record.options = vec![options::single_option(
        &record.title,
        &record.product_id,
        &price,
        options::NOT_AVAILABLE,
    )];
}

pub(crate) fn require_mandatory(record: &ProductRecord) -> Result<(), ExtractionError> {
    if record.product_id.trim().is_empty() {
        return Err(ExtractionError::MissingIdentifier);
    }
    if record.title.trim().is_empty() {
        return Err(ExtractionError::MissingTitle {
            product_id: record.product_id.clone(),
        });
    }
    Ok(())
}

/// Trimmed text content of an element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text of the first match, or empty.
pub(crate) fn first_text(doc: &Html, selector: &Selector) -> String {
    doc.select(selector).next().map(text_of).unwrap_or_default()
}

/// Non-empty attribute value.
pub(crate) fn attr_of(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
