//! Store operations on the market document.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    HistoryEntry, InsightPick, KeywordInsight, MarketDocument, ProductRecord, TrackedProduct,
};

/// Number of cheapest listings kept in an insight.
pub const TOP_PICKS: usize = 3;

/// Insight over a discovery batch; `None` for an empty batch.
pub fn compute_insight(batch: &[ProductRecord], now: DateTime<Utc>) -> Option<KeywordInsight> {
    let mut priced: Vec<&ProductRecord> = batch.iter().collect();
    // Stable: equal prices keep batch order
    priced.sort_by_key(|record| record.tracked_price());

    let lowest = priced.first()?.tracked_price();
    Some(KeywordInsight {
        lowest_price: lowest,
        item_count: batch.len(),
        updated_at: now,
        top3: priced
            .iter()
            .take(TOP_PICKS)
            .map(|record| InsightPick {
                id: record.product_id.clone(),
                title: record.title.clone(),
                price: record.tracked_price(),
                image: record.thumbnail().map(str::to_string),
            })
            .collect(),
    })
}

impl MarketDocument {
    /// Track a listing the first time it is seen. Returns whether it was added.
    pub fn upsert_tracked(&mut self, product: TrackedProduct) -> bool {
        if self
            .tracked_products
            .iter()
            .any(|p| p.product_id == product.product_id)
        {
            return false;
        }
        self.tracked_products.push(product);
        true
    }

    /// Append a snapshot unless one already exists for that date.
    pub fn append_history(&mut self, product_id: &str, entry: HistoryEntry) -> bool {
        let entries = self.history.entry(product_id.to_string()).or_default();
        if entries.iter().any(|e| e.date == entry.date) {
            return false;
        }
        entries.push(entry);
        true
    }

    /// Snapshot a record's price and review count for `date`.
    pub fn record_snapshot(&mut self, record: &ProductRecord, date: NaiveDate) -> bool {
        self.append_history(
            &record.product_id,
            HistoryEntry {
                date,
                price: record.tracked_price(),
                reviews: record.ratings.total_count,
            },
        )
    }

    /// Replace the keyword's insight. An empty batch leaves the previous one.
    pub fn record_insight(
        &mut self,
        keyword: &str,
        batch: &[ProductRecord],
        now: DateTime<Utc>,
    ) -> Option<&KeywordInsight> {
        let insight = compute_insight(batch, now)?;
        self.insights.insert(keyword.to_string(), insight);
        self.insights.get(keyword)
    }

    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k == keyword) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k != keyword.trim());
        self.keywords.len() != before
    }
}

/// Today's date in UTC, the key history entries are deduplicated by.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, Price};

    fn record(id: &str, price: &str) -> ProductRecord {
        let mut record = ProductRecord::new(id, format!("item {}", id), Platform::Gmarket);
        record.sale_price = Price::from_text(price);
        record.images.push(format!("https://img/{}.jpg", id));
        record
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn append_history_is_idempotent_per_date() {
        let mut doc = MarketDocument::default();
        let entry = HistoryEntry {
            date: date("2026-10-18"),
            price: 1000,
            reviews: 3,
        };
        assert!(doc.append_history("A", entry.clone()));
        assert!(!doc.append_history(
            "A",
            HistoryEntry {
                price: 900,
                ..entry.clone()
            }
        ));
        assert_eq!(doc.history["A"], vec![entry.clone()]);

        assert!(doc.append_history(
            "A",
            HistoryEntry {
                date: date("2026-10-19"),
                ..entry
            }
        ));
        assert_eq!(doc.history["A"].len(), 2);
    }

    #[test]
    fn upsert_tracked_inserts_once() {
        let mut doc = MarketDocument::default();
        let product = TrackedProduct {
            product_id: "A".into(),
            title: "first".into(),
            image: None,
            keyword: "mouse".into(),
            platform: Platform::Gmarket,
        };
        assert!(doc.upsert_tracked(product.clone()));
        assert!(!doc.upsert_tracked(TrackedProduct {
            title: "second".into(),
            ..product
        }));
        assert_eq!(doc.tracked_products.len(), 1);
        assert_eq!(doc.tracked_products[0].title, "first");
    }

    #[test]
    fn insight_picks_cheapest_first() {
        let batch = [record("a", "300"), record("b", "100"), record("c", "500")];
        let now = Utc::now();
        let insight = compute_insight(&batch, now).unwrap();

        assert_eq!(insight.lowest_price, 100);
        assert_eq!(insight.item_count, 3);
        assert_eq!(insight.updated_at, now);
        let prices: Vec<u64> = insight.top3.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![100, 300, 500]);
        assert_eq!(insight.top3[0].image.as_deref(), Some("https://img/b.jpg"));
    }

    #[test]
    fn insight_keeps_three_and_counts_all() {
        let batch = [
            record("a", "40"),
            record("b", "10"),
            record("c", "30"),
            record("d", "20"),
            record("e", "10"),
        ];
        let insight = compute_insight(&batch, Utc::now()).unwrap();
        assert_eq!(insight.item_count, 5);
        let ids: Vec<&str> = insight.top3.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "d"]);
    }

    #[test]
    fn empty_batch_leaves_prior_insight() {
        let mut doc = MarketDocument::default();
        doc.record_insight("mouse", &[record("a", "300")], Utc::now());
        assert!(doc.record_insight("mouse", &[], Utc::now()).is_none());
        assert_eq!(doc.insights["mouse"].lowest_price, 300);

        doc.record_insight("mouse", &[record("b", "200")], Utc::now());
        assert_eq!(doc.insights["mouse"].lowest_price, 200);
    }

    #[test]
    fn keywords_are_unique() {
        let mut doc = MarketDocument::default();
        assert!(!doc.add_keyword("wireless mouse"));
        assert!(!doc.add_keyword("  "));
        assert!(doc.add_keyword(" tumbler "));
        assert_eq!(doc.keywords.last().map(String::as_str), Some("tumbler"));

        assert!(doc.remove_keyword("tumbler"));
        assert!(!doc.remove_keyword("tumbler"));
    }

    #[test]
    fn snapshot_uses_tracked_price_and_reviews() {
        let mut doc = MarketDocument::default();
        let mut rec = record("a", "12,900원");
        rec.ratings.total_count = 42;
        assert!(doc.record_snapshot(&rec, date("2026-10-18")));
        assert_eq!(doc.history["a"][0].price, 12900);
        assert_eq!(doc.history["a"][0].reviews, 42);
    }
}
