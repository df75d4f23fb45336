//! Option price decoding.
//!
//! Option prices are shown as a base amount with an optional signed
//! adjustment, e.g. `156,800원 (-31,000원)`. The real price is their sum.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Currency suffix appended to formatted amounts.
pub const WON: &str = "원";

static BASE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9,]+)").expect("static regex must compile"));

static ADJUSTMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([+-])([0-9,]+)원\)").expect("static regex must compile")
});

/// An option row whose price text could not be decoded. The row is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed option price text: {0:?}")]
pub struct MalformedOptionRow(pub String);

fn parse_grouped(digits: &str) -> Option<i64> {
    let plain: String = digits.chars().filter(|c| *c != ',').collect();
    if plain.is_empty() {
        return None;
    }
    plain.parse().ok()
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Base amount plus adjustment, in won.
pub fn decode_real_price(raw: &str) -> Result<i64, MalformedOptionRow> {
    let text = collapse_whitespace(raw);
    let malformed = || MalformedOptionRow(text.clone());

    let base = BASE_AMOUNT
        .captures(&text)
        .and_then(|c| parse_grouped(&c[1]))
        .ok_or_else(malformed)?;

    let adjustment = match ADJUSTMENT.captures(&text) {
        Some(c) => {
            let amount = parse_grouped(&c[2]).ok_or_else(malformed)?;
            if &c[1] == "+" {
                amount
            } else {
                -amount
            }
        }
        None => 0,
    };

    base.checked_add(adjustment).ok_or_else(malformed)
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `125800` → `125,800원`.
pub fn format_won(amount: i64) -> String {
    format!("{}{}", group_thousands(amount), WON)
}

/// Decoded real price rendered for display.
pub fn real_price_text(raw: &str) -> Result<String, MalformedOptionRow> {
    decode_real_price(raw).map(format_won)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_adjustment_is_subtracted() {
        assert_eq!(real_price_text("156,800원 (-31,000원)").unwrap(), "125,800원");
    }

    #[test]
    fn positive_adjustment_is_added() {
        assert_eq!(real_price_text("9,900원 (+1,000원)").unwrap(), "10,900원");
    }

    #[test]
    fn plain_price_is_unchanged() {
        assert_eq!(real_price_text("156,800원").unwrap(), "156,800원");
        assert_eq!(decode_real_price("  156,800원\n").unwrap(), 156_800);
    }

    #[test]
    fn undecodable_text_is_malformed() {
        assert!(decode_real_price("품절").is_err());
        assert!(decode_real_price(",원").is_err());
        assert!(decode_real_price("").is_err());
    }

    #[test]
    fn overflowing_adjustment_is_malformed() {
        assert!(decode_real_price("9,223,372,036,854,775,807원 (+1원)").is_err());
        assert_eq!(
            decode_real_price("9,223,372,036,854,775,807원 (-1원)").unwrap(),
            i64::MAX - 1
        );
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(format_won(-500), "-500원");
    }
}
