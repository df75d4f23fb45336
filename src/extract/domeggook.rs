//! Domeggook item page extraction.
//!
//! Options live on a separate popup page that the fetch session renders as a
//! supplement; without it, the listing gets a single placeholder option.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use super::options::{decode_option_table, labeled_rows, price_tiers, single_option};
use super::selectors::domeggook as sel;
use super::url::normalize_image_url;
use super::{attr_of, first_text, ExtractionError, Extractor};
use crate::browser::RenderedContent;
use crate::models::{Platform, ProductRecord, SpecEntry, StoreInfo};

/// Path fragment identifying the option popup among the supplements.
pub const OPTION_POPUP: &str = "popup_itemOptionView";

/// Shown when no price or stock can be found.
pub use super::options::NOT_AVAILABLE;

const STOCK_LABEL: &str = "재고수량";

static WON_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9,]+)\s*원").expect("static regex must compile"));

static STOCK_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"재고수량\s*([0-9,]+개)").expect("static regex must compile"));

pub struct DomeggookExtractor;

impl DomeggookExtractor {
    /// Rows of the stock/origin tables, price rows excluded.
    fn specs(doc: &Html) -> Vec<SpecEntry> {
        doc.select(&sel::INFO_TABLES)
            .filter(|t| {
                let text = t.text().collect::<String>();
                text.contains(STOCK_LABEL) || text.contains("원산지")
            })
            .flat_map(|t| labeled_rows(t.select(&super::selectors::table::ROWS)))
            .filter(|row| !row.label.contains("단가"))
            .map(|row| SpecEntry {
                attr_name: row.label,
                attr_value: row.value,
            })
            .collect()
    }

    fn images(doc: &Html, selector: &scraper::Selector) -> Vec<String> {
        doc.select(selector)
            .filter_map(|img| attr_of(img, "src").or_else(|| attr_of(img, "data-src")))
            .map(|src| normalize_image_url(&src))
            .collect()
    }

    /// First price tier, else the `N원` amount in the price block.
    fn main_price(record: &ProductRecord, doc: &Html) -> String {
        if let Some(tier) = record.prices.first() {
            return tier.price.clone();
        }
        let text: String = doc
            .select(&sel::LIST_PRICE)
            .flat_map(|el| el.text())
            .collect();
        WON_AMOUNT
            .captures(text.trim())
            .map(|c| format!("{}원", &c[1]))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Stock spec, else a `재고수량 N개` mention in the info body.
    fn main_stock(record: &ProductRecord, doc: &Html) -> String {
        if let Some(spec) = record.specs.iter().find(|s| s.attr_name == STOCK_LABEL) {
            return spec.attr_value.clone();
        }
        let body: String = doc
            .select(&sel::INFO_BODY)
            .flat_map(|el| el.text())
            .collect();
        STOCK_AMOUNT
            .captures(&body)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl Extractor for DomeggookExtractor {
    fn platform(&self) -> Platform {
        Platform::Domeggook
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

        let mut record = ProductRecord::new(product_id.trim(), title, Platform::Domeggook);
        super::require_mandatory(&record)?;

        record.prices = price_tiers(&doc);
        record.images = Self::images(&doc, &sel::THUMBNAILS);
        record.description = doc
            .select(&sel::DESCRIPTION)
            .next()
            .map(|el| el.inner_html())
            .unwrap_or_default();
        record.detail_images = Self::images(&doc, &sel::DESCRIPTION_IMAGES);
        record.specs = Self::specs(&doc);

        let vendor = Some(first_text(&doc, &sel::VENDOR))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| first_text(&doc, &sel::VENDOR_FALLBACK));
        record.store_info = StoreInfo {
            name: vendor,
            rating: None,
        };
        record.supplier_info = labeled_rows(doc.select(&sel::SUPPLIER_ROWS));
        record.return_info = labeled_rows(doc.select(&sel::RETURN_ROWS));

        record.options = content
            .supplement(OPTION_POPUP)
            .map(|popup| decode_option_table(&popup.html))
            .unwrap_or_default();

        if record.options.is_empty() {
            let price = Self::main_price(&record, &doc);
            let stock = Self::main_stock(&record, &doc);
            record.options = vec![single_option(
                &record.title,
                &record.product_id,
                &price,
                &stock,
            )];
        }

        record.source_url = Some(content.page.final_url.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::RenderedPage;

    const ITEM_PAGE: &str = r#"
        <html><body>
          <h1 class="lInfoRow">스테인리스 텀블러 500ml</h1>
          <div class="thumbLightbox">
            <img src="//cdn.domeggook.com/upload/item/1.jpg">
            <img src="https://cdn.domeggook.com/upload/item/2.jpg">
          </div>
          <div class="lInfoBody">
            <table>
              <caption>단가(원)</caption>
              <tr><th>1~9개</th><th>10개 이상</th></tr>
              <tr><td>7,800</td><td>7,500</td></tr>
            </table>
            <table>
              <tr><th>재고수량</th><td>1,200개</td></tr>
              <tr><th>원산지</th><td>중국
                  (OEM)</td></tr>
            </table>
          </div>
          <div id="lInfoViewItemContents"><p>상세</p><img data-src="//cdn.domeggook.com/d/1.jpg"></div>
          <span class="lVendorName">도매상사</span>
          <div id="lSellerPopInfoDetail"><table class="lTbl">
            <tr><th>상호</th><td>도매상사</td></tr>
            <tr><th>연락처</th><td></td></tr>
          </table></div>
          <table id="lReturnInfo"><tr><th>반품기간</th><td>수령 후 7일</td></tr></table>
        </body></html>"#;

    const POPUP: &str = r#"
        <table id="itemOptAllViewTable">
          <tr><th>코드</th><th>옵션</th><th>가격</th><th>재고</th></tr>
          <tr><td>01</td><td>실버</td><td>7,800원</td><td>500개</td></tr>
          <tr><td>02</td><td>블랙</td><td>7,800원 (+500원)</td><td>700개</td></tr>
        </table>"#;

    fn content(html: &str, popup: Option<&str>) -> RenderedContent {
        RenderedContent {
            page: RenderedPage::new("https://domeggook.com/5500123", html),
            supplements: popup
                .map(|p| {
                    vec![RenderedPage::new(
                        Platform::Domeggook.supplementary_urls("5500123")[0].clone(),
                        p,
                    )]
                })
                .unwrap_or_default(),
        }
    }

    #[test]
    fn extracts_item_with_popup_options() {
        let record = DomeggookExtractor
            .extract("5500123", &content(ITEM_PAGE, Some(POPUP)))
            .unwrap();

        assert_eq!(record.title, "스테인리스 텀블러 500ml");
        assert_eq!(record.images[0], "https://cdn.domeggook.com/upload/item/1.jpg");
        assert_eq!(record.prices.len(), 2);
        assert_eq!(record.prices[0].qty, "1~9개");
        assert_eq!(record.prices[1].price, "7,500");
        assert_eq!(record.detail_images, vec!["https://cdn.domeggook.com/d/1.jpg"]);
        assert!(record.description.contains("상세"));
        assert_eq!(record.specs.len(), 2);
        assert_eq!(record.specs[1].attr_value, "중국 (OEM)");
        assert_eq!(record.store_info.name, "도매상사");
        assert_eq!(record.supplier_info.len(), 1);
        assert_eq!(record.return_info[0].value, "수령 후 7일");

        assert_eq!(record.options.len(), 2);
        assert_eq!(record.options[1].real_price, "8,300원");
    }

    #[test]
    fn missing_popup_falls_back_to_single_option() {
        let record = DomeggookExtractor
            .extract("5500123", &content(ITEM_PAGE, None))
            .unwrap();

        assert_eq!(record.options.len(), 1);
        let option = &record.options[0];
        assert_eq!(option.code, "00");
        assert_eq!(option.name, "(단일옵션) 스테인리스 텀블러 500ml");
        assert_eq!(option.price, "7,800");
        assert_eq!(option.stock, "1,200개");
    }

    #[test]
    fn fallback_reads_price_block_and_body_stock() {
        let html = r#"
            <div class="lItemTitle">머그컵</div>
            <div class="lItemPrice">판매가 3,500 원</div>
            <div class="lInfoBody"><p>재고수량 40개 남음</p></div>"#;
        let record = DomeggookExtractor
            .extract("77", &content(html, None))
            .unwrap();
        let option = &record.options[0];
        assert_eq!(option.price, "3,500원");
        assert_eq!(option.real_price, "3,500원");
        assert_eq!(option.stock, "40개");
    }

    #[test]
    fn fallback_without_anything_is_not_available() {
        let record = DomeggookExtractor
            .extract("77", &content("<h1 class=\"lInfoRow\">컵</h1>", None))
            .unwrap();
        assert_eq!(record.options[0].price, NOT_AVAILABLE);
        assert_eq!(record.options[0].stock, NOT_AVAILABLE);
    }
}
