//! Marketplace identifiers.

use serde::{Deserialize, Serialize};

/// A supported marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Gmarket,
    Domeggook,
    Aliexpress,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Self::Gmarket, Self::Domeggook, Self::Aliexpress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gmarket => "gmarket",
            Self::Domeggook => "domeggook",
            Self::Aliexpress => "aliexpress",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gmarket" => Some(Self::Gmarket),
            "domeggook" | "dome" => Some(Self::Domeggook),
            "aliexpress" | "ali" => Some(Self::Aliexpress),
            _ => None,
        }
    }

    /// Product detail page for an identifier.
    pub fn detail_url(&self, id: &str) -> String {
        match self {
            Self::Gmarket => format!("https://item.gmarket.co.kr/Item?goodscode={}", id),
            Self::Domeggook => format!("https://domeggook.com/{}", id),
            Self::Aliexpress => format!("https://www.aliexpress.com/item/{}.html", id),
        }
    }

    /// Secondary pages rendered in the same session as the detail page.
    pub fn supplementary_urls(&self, id: &str) -> Vec<String> {
        match self {
            Self::Domeggook => vec![format!(
                "https://domeggook.com/main/popup/item/popup_itemOptionView.php?no={}&market=dome",
                id
            )],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid platform '{}'. Valid options: gmarket, domeggook, aliexpress",
                s
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_from_str() {
        assert_eq!(Platform::from_str("gmarket"), Some(Platform::Gmarket));
        assert_eq!(Platform::from_str(" Domeggook "), Some(Platform::Domeggook));
        assert_eq!(Platform::from_str("ali"), Some(Platform::Aliexpress));
        assert_eq!(Platform::from_str("amazon"), None);
    }

    #[test]
    fn supplementary_pages_only_for_domeggook() {
        assert!(Platform::Gmarket.supplementary_urls("1").is_empty());
        let urls = Platform::Domeggook.supplementary_urls("63319623");
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("no=63319623"));
    }
}
