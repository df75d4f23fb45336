//! Normalized product listing records.

use serde::{Deserialize, Serialize};

use super::Platform;

/// Opaque marketplace-scoped listing key.
pub type ProductIdentifier = String;

/// A price as both a number and the text the marketplace displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub value: u64,
    pub formatted: String,
}

impl Price {
    /// Build a price from display text, keeping only its digits for the value.
    pub fn from_text(text: &str) -> Self {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        Self {
            value: digits.parse().unwrap_or(0),
            formatted: text.trim().to_string(),
        }
    }
}

/// One name/value row from a specification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecEntry {
    pub attr_name: String,
    pub attr_value: String,
}

/// A labelled value (supplier and return-policy tables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

/// Quantity tier of a wholesale price table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub qty: String,
    pub price: String,
}

/// A purchasable option of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRow {
    pub code: String,
    pub name: String,
    /// Price text as displayed, e.g. `156,800원 (-31,000원)`.
    pub price: String,
    /// Base plus adjustment, e.g. `125,800원`.
    pub real_price: String,
    pub stock: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    pub average_star: f64,
    pub total_count: u64,
}

/// Structured representation of one scraped listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub product_id: ProductIdentifier,
    pub sale_price: Price,
    pub original_price: Price,
    pub images: Vec<String>,
    pub specs: Vec<SpecEntry>,
    pub options: Vec<OptionRow>,
    pub store_info: StoreInfo,
    pub ratings: Ratings,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<PriceTier>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detail_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supplier_info: Vec<LabeledValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub return_info: Vec<LabeledValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl ProductRecord {
    /// Empty record for a listing; extractors fill in what they find.
    pub fn new(product_id: impl Into<String>, title: impl Into<String>, platform: Platform) -> Self {
        Self {
            title: title.into(),
            product_id: product_id.into(),
            sale_price: Price::default(),
            original_price: Price::default(),
            images: Vec::new(),
            specs: Vec::new(),
            options: Vec::new(),
            store_info: StoreInfo::default(),
            ratings: Ratings::default(),
            platform,
            prices: Vec::new(),
            description: String::new(),
            detail_images: Vec::new(),
            supplier_info: Vec::new(),
            return_info: Vec::new(),
            source_url: None,
        }
    }

    /// First image, used as the listing thumbnail.
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(|s| s.as_str())
    }

    /// Price used for history and insights: the sale price, else the first option's real price.
    pub fn tracked_price(&self) -> u64 {
        if self.sale_price.value > 0 {
            return self.sale_price.value;
        }
        self.options
            .first()
            .map(|o| Price::from_text(&o.real_price).value)
            .unwrap_or(0)
    }
}

/// Result of processing one identifier: a record or the reason it failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Success(Box<ProductRecord>),
    #[serde(rename_all = "camelCase")]
    Failure {
        product_id: ProductIdentifier,
        error: String,
    },
}

impl ItemOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Success(record) => &record.product_id,
            Self::Failure { product_id, .. } => product_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
