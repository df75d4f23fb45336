//! CSS selectors for marketplace pages.
//!
//! Update this file when a marketplace changes its markup, and add a
//! fixture to the matching extractor's tests.

use scraper::Selector;
use std::sync::LazyLock;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Gmarket item pages.
pub mod gmarket {
    use super::*;

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| sel(".itemtit"));
    pub static TITLE_FALLBACK: LazyLock<Selector> = LazyLock::new(|| sel("h1"));

    pub static SALE_PRICE: LazyLock<Selector> = LazyLock::new(|| sel(".price_real"));
    pub static ORIGINAL_PRICE: LazyLock<Selector> =
        LazyLock::new(|| sel(".text__price-original"));
    pub static ORIGINAL_PRICE_FALLBACK: LazyLock<Selector> = LazyLock::new(|| sel(".price_ori"));

    /// Main image.
    pub static MAIN_IMAGE: LazyLock<Selector> = LazyLock::new(|| sel("#objImg"));
    pub static VIEWER_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| sel(".box__viewer-container img"));
    pub static THUMB_IMAGES: LazyLock<Selector> =
        LazyLock::new(|| sel(".box__thumb-container img"));

    pub static SELLER: LazyLock<Selector> = LazyLock::new(|| sel(".link__seller"));
    pub static SELLER_FALLBACK: LazyLock<Selector> = LazyLock::new(|| sel(".seller_name"));

    pub static SCORE: LazyLock<Selector> = LazyLock::new(|| sel(".text__score"));

    /// Elements scanned for the review counter.
    pub static REVIEW_CANDIDATES: LazyLock<Selector> =
        LazyLock::new(|| sel("span, a, em, strong, p"));
}

/// Domeggook item pages and the option popup.
pub mod domeggook {
    use super::*;

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| sel("h1.lInfoRow"));
    pub static TITLE_FALLBACK: LazyLock<Selector> = LazyLock::new(|| sel(".lItemTitle"));

    pub static INFO_TABLES: LazyLock<Selector> = LazyLock::new(|| sel(".lInfoBody table"));
    pub static INFO_BODY: LazyLock<Selector> = LazyLock::new(|| sel(".lInfoBody"));
    pub static LIST_PRICE: LazyLock<Selector> = LazyLock::new(|| sel(".lItemPrice, .lPrice"));

    pub static THUMBNAILS: LazyLock<Selector> = LazyLock::new(|| sel(".thumbLightbox img"));
    pub static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| sel("#lInfoViewItemContents"));
    pub static DESCRIPTION_IMAGES: LazyLock<Selector> =
        LazyLock::new(|| sel("#lInfoViewItemContents img"));

    pub static VENDOR: LazyLock<Selector> = LazyLock::new(|| sel(".lVendorName"));
    pub static VENDOR_FALLBACK: LazyLock<Selector> = LazyLock::new(|| sel(".lInfoVend"));

    pub static SUPPLIER_ROWS: LazyLock<Selector> =
        LazyLock::new(|| sel("#lSellerPopInfoDetail .lTbl tr"));
    pub static RETURN_ROWS: LazyLock<Selector> = LazyLock::new(|| sel("#lReturnInfo tr"));

    /// Option popup rows.
    pub static OPTION_ROWS: LazyLock<Selector> = LazyLock::new(|| sel("#itemOptAllViewTable tr"));

    /// Category listing rows (`li#li12345`).
    pub static LIST_ROWS: LazyLock<Selector> =
        LazyLock::new(|| sel("ol.lItemList li[id^=\"li\"]"));
    pub static LIST_THUMB: LazyLock<Selector> = LazyLock::new(|| sel("a.thumb img"));
    pub static LIST_TITLE: LazyLock<Selector> = LazyLock::new(|| sel("a.title"));
    pub static LIST_AMOUNT: LazyLock<Selector> = LazyLock::new(|| sel(".amt b"));
}

/// AliExpress item and search pages.
pub mod aliexpress {
    use super::*;

    pub static SCRIPTS: LazyLock<Selector> = LazyLock::new(|| sel("script"));
    pub static OG_TITLE: LazyLock<Selector> =
        LazyLock::new(|| sel("meta[property=\"og:title\"]"));
    pub static OG_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| sel("meta[property=\"og:image\"]"));
    pub static TITLE_FALLBACK: LazyLock<Selector> = LazyLock::new(|| sel("h1"));

    pub static ITEM_LINKS: LazyLock<Selector> = LazyLock::new(|| sel("a[href*=\"/item/\"]"));
}

/// Gmarket search pages.
pub mod gmarket_search {
    use super::*;

    pub static NEXT_DATA: LazyLock<Selector> = LazyLock::new(|| sel("script#__NEXT_DATA__"));
    pub static ITEM_LINKS: LazyLock<Selector> = LazyLock::new(|| sel("a.link__item"));
}

/// Shared table parts.
pub mod table {
    use super::*;

    pub static ROWS: LazyLock<Selector> = LazyLock::new(|| sel("tr"));
    pub static CELLS: LazyLock<Selector> = LazyLock::new(|| sel("td, th"));
    pub static TD: LazyLock<Selector> = LazyLock::new(|| sel("td"));
    pub static TH: LazyLock<Selector> = LazyLock::new(|| sel("th"));
}
