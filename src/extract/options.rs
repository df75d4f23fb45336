//! Option and price-tier table decoding.

use indexmap::IndexMap;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::price::{collapse_whitespace, real_price_text};
use super::selectors::{domeggook, table};
use super::text_of;
use crate::models::{LabeledValue, OptionRow, PriceTier};

/// Header cell text marking a wholesale price table.
pub const PRICE_TABLE_MARKER: &str = "단가(원)";

/// Code given to the synthesized option of a single-option listing.
pub const SINGLE_OPTION_CODE: &str = "00";

/// Name prefix of the synthesized option.
pub const SINGLE_OPTION_PREFIX: &str = "(단일옵션) ";

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&table::CELLS).map(text_of).collect()
}

/// Zip a header row with the cells of the rows below it.
///
/// Values are read in document order across all body rows; positions
/// missing a header or a value are skipped.
pub fn zip_price_table(table_el: ElementRef<'_>) -> Vec<PriceTier> {
    let mut rows = table_el.select(&table::ROWS);
    let headers = match rows.next() {
        Some(row) => cell_texts(row),
        None => return Vec::new(),
    };
    let values: Vec<String> = rows.flat_map(cell_texts).collect();

    headers
        .iter()
        .zip(values.iter())
        .filter(|(qty, price)| !qty.is_empty() && !price.is_empty())
        .map(|(qty, price)| PriceTier {
            qty: qty.clone(),
            price: price.clone(),
        })
        .collect()
}

/// Tiers from every info table carrying the price-table marker.
pub fn price_tiers(doc: &Html) -> Vec<PriceTier> {
    doc.select(&domeggook::INFO_TABLES)
        .filter(|t| t.text().collect::<String>().contains(PRICE_TABLE_MARKER))
        .flat_map(zip_price_table)
        .collect()
}

/// `th`/`td` pairs of a label table, whitespace collapsed.
pub fn labeled_rows<'a>(rows: impl Iterator<Item = ElementRef<'a>>) -> Vec<LabeledValue> {
    rows.filter_map(|tr| {
        let label = tr.select(&table::TH).map(text_of).collect::<Vec<_>>().join("");
        let value = tr
            .select(&table::TD)
            .map(text_of)
            .collect::<Vec<_>>()
            .join(" ");
        let value = collapse_whitespace(&value);
        (!label.is_empty() && !value.is_empty()).then_some(LabeledValue { label, value })
    })
    .collect()
}

/// Rows of the option popup table. The header row and rows with fewer
/// than four cells are skipped; rows whose price cannot be decoded are dropped.
pub fn decode_option_table(html: &str) -> Vec<OptionRow> {
    let doc = Html::parse_document(html);
    let rows = doc
        .select(&domeggook::OPTION_ROWS)
        .skip(1)
        .filter_map(|tr| {
            let cells: Vec<String> = tr.select(&table::TD).map(text_of).collect();
            if cells.len() < 4 {
                return None;
            }
            let price = collapse_whitespace(&cells[2]);
            match real_price_text(&price) {
                Ok(real_price) => Some(OptionRow {
                    code: cells[0].clone(),
                    name: cells[1].clone(),
                    price,
                    real_price,
                    stock: cells[3].clone(),
                }),
                Err(e) => {
                    debug!("Dropping option {}: {}", cells[0], e);
                    None
                }
            }
        });
    dedup_by_code(rows)
}

/// One row per code, keeping the last write in first-seen order.
pub fn dedup_by_code(rows: impl IntoIterator<Item = OptionRow>) -> Vec<OptionRow> {
    let mut by_code: IndexMap<String, OptionRow> = IndexMap::new();
    for row in rows {
        by_code.insert(row.code.clone(), row);
    }
    by_code.into_values().collect()
}

/// Placeholder option for listings without an option table.
/// Placeholder for a value the page does not show.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn single_option(title: &str, product_id: &str, price: &str, stock: &str) -> OptionRow {
    let label = if title.is_empty() { product_id } else { title };
    OptionRow {
        code: SINGLE_OPTION_CODE.to_string(),
        name: format!("{}{}", SINGLE_OPTION_PREFIX, label),
        price: price.to_string(),
        real_price: price.to_string(),
        stock: stock.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POPUP: &str = r#"
        <table id="itemOptAllViewTable">
          <tr><th>코드</th><th>옵션명</th><th>가격</th><th>재고</th></tr>
          <tr><td>01</td><td>블랙</td><td>156,800원
              (-31,000원)</td><td>120개</td></tr>
          <tr><td>02</td><td>화이트</td><td>156,800원</td><td>80개</td></tr>
          <tr><td>03</td><td>레드</td><td>품절</td><td>0개</td></tr>
          <tr><td>04</td><td>짧은행</td></tr>
        </table>"#;

    #[test]
    fn decodes_option_rows() {
        let rows = decode_option_table(POPUP);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "01");
        assert_eq!(rows[0].price, "156,800원 (-31,000원)");
        assert_eq!(rows[0].real_price, "125,800원");
        assert_eq!(rows[1].real_price, "156,800원");
        assert_eq!(rows[1].stock, "80개");
    }

    #[test]
    fn dedup_keeps_last_write_in_first_position() {
        let row = |code: &str, name: &str| OptionRow {
            code: code.into(),
            name: name.into(),
            price: "1원".into(),
            real_price: "1원".into(),
            stock: "N/A".into(),
        };
        let rows = dedup_by_code(vec![row("00", "first"), row("01", "x"), row("00", "second")]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "00");
        assert_eq!(rows[0].name, "second");
        assert_eq!(rows[1].code, "01");
    }

    #[test]
    fn price_table_zips_headers_with_values() {
        let html = r#"<div class="lInfoBody"><table>
            <tr><th>수량</th><th>1개 이상</th><th>10개 이상</th><th></th></tr>
            <tr><td>단가(원)</td><td>5,000</td><td>4,500</td><td>4,000</td></tr>
        </table></div>"#;
        let doc = Html::parse_document(html);
        let tiers = price_tiers(&doc);
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0], PriceTier { qty: "수량".into(), price: "단가(원)".into() });
        assert_eq!(tiers[1].qty, "1개 이상");
        assert_eq!(tiers[1].price, "5,000");
    }

    #[test]
    fn tables_without_marker_are_ignored() {
        let doc = Html::parse_document(
            r#"<div class="lInfoBody"><table><tr><th>원산지</th></tr><tr><td>중국</td></tr></table></div>"#,
        );
        assert!(price_tiers(&doc).is_empty());
    }

    #[test]
    fn single_option_uses_title_or_id() {
        let opt = single_option("무선 마우스", "123", "5,000원", "N/A");
        assert_eq!(opt.code, "00");
        assert_eq!(opt.name, "(단일옵션) 무선 마우스");
        assert_eq!(opt.real_price, "5,000원");
        assert_eq!(single_option("", "123", "N/A", "N/A").name, "(단일옵션) 123");
    }
}
