//! Histogram aggregation for grouped bar charts.
//!
//! Turns backend buckets (`{timestamp, types: [{type, count}]}`) into one row per
//! bucket holding a sum per chart category. Every category of the map is present
//! in every row, unknown type tags are dropped, and rows keep input order.

use anyhow::{anyhow, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::categories::{CategoryMap, Collection};
use crate::types::MetricBucket;

/// One chart row: a bucket timestamp plus a value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow {
    timestamp: String,
    values: Vec<(String, f64)>,
}

impl HistogramRow {
    /// Row with every category zeroed. A repeated category keeps one slot.
    pub fn zeroed(timestamp: impl Into<String>, categories: &[String]) -> Self {
        let mut values: Vec<(String, f64)> = Vec::with_capacity(categories.len());
        for c in categories {
            if !values.iter().any(|(seen, _)| seen == c) {
                values.push((c.clone(), 0.0));
            }
        }
        Self {
            timestamp: timestamp.into(),
            values,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, v)| *v)
    }

    pub fn values(&self) -> &[(String, f64)] {
        &self.values
    }

    pub fn total(&self) -> f64 {
        self.values.iter().map(|(_, v)| v).sum()
    }

    fn add(&mut self, category: &str, n: f64) {
        if let Some((_, v)) = self.values.iter_mut().find(|(c, _)| c == category) {
            *v += n;
        }
    }

    fn set(&mut self, category: &str, n: f64) {
        match self.values.iter_mut().find(|(c, _)| c == category) {
            Some((_, v)) => *v = n,
            None => self.values.push((category.to_string(), n)),
        }
    }
}

// Flat object: `timestamp` first, then categories in order. NaN goes out as null.
impl Serialize for HistogramRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        for (category, value) in &self.values {
            map.serialize_entry(category, value)?;
        }
        map.end()
    }
}

/// `Number()` whitespace: Unicode `White_Space` minus NEL, plus the BOM.
fn is_number_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Numeric coercion with the backend's `Number()` semantics.
///
/// Whitespace is trimmed, an empty string is 0, `0x`/`0o`/`0b` prefixes and
/// `Infinity` are understood. Anything else malformed is NaN.
pub fn parse_number(s: &str) -> f64 {
    let t = s.trim_matches(is_number_space);
    if t.is_empty() {
        return 0.0;
    }

    let radix = |digits: &str, base: u32| -> f64 {
        if digits.is_empty() {
            return f64::NAN;
        }
        digits
            .chars()
            .try_fold(0f64, |acc, ch| ch.to_digit(base).map(|d| acc * base as f64 + d as f64))
            .unwrap_or(f64::NAN)
    };
    let lower = t.to_ascii_lowercase();
    if let Some(d) = lower.strip_prefix("0x") {
        return radix(d, 16);
    }
    if let Some(d) = lower.strip_prefix("0o") {
        return radix(d, 8);
    }
    if let Some(d) = lower.strip_prefix("0b") {
        return radix(d, 2);
    }

    let unsigned = t.trim_start_matches(['+', '-']);
    if unsigned.len() + 1 < t.len() {
        return f64::NAN;
    }
    if unsigned == "Infinity" {
        return if t.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    // Rust accepts "inf"/"nan"/"infinity" in any case; Number() does not.
    if unsigned.chars().next().map_or(true, |c| c.is_ascii_alphabetic()) {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Sum each bucket's type counts into chart categories.
///
/// `categories` is the zero-initialised key set for every row, normally
/// `category_map.categories()`. Tags missing from the map are skipped. A bucket
/// without `types` is rejected.
pub fn aggregate(
    buckets: &[MetricBucket],
    category_map: &CategoryMap,
    categories: &[String],
) -> Result<Vec<HistogramRow>> {
    buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let types = bucket.types.as_ref().ok_or_else(|| {
                anyhow!(
                    "bucket {i} ({}) has no types for '{}' histogram",
                    bucket.timestamp,
                    category_map.name()
                )
            })?;
            let mut row = HistogramRow::zeroed(bucket.timestamp.clone(), categories);
            for t in types {
                match category_map.get(&t.r#type) {
                    Some(desc) => row.add(&desc.category, parse_number(&t.count)),
                    None => log::trace!("[histogram] skipping unmapped type '{}'", t.r#type),
                }
            }
            Ok(row)
        })
        .collect()
}

/// Single-category variant: the bucket's own `count` goes straight into
/// `category`.
pub fn aggregate_flat(buckets: &[MetricBucket], category: &str) -> Vec<HistogramRow> {
    buckets
        .iter()
        .map(|bucket| {
            let mut row = HistogramRow {
                timestamp: bucket.timestamp.clone(),
                values: Vec::with_capacity(1),
            };
            row.set(category, parse_number(&bucket.count));
            row
        })
        .collect()
}

/// Aggregate with whichever shape `collection` uses.
pub fn build_rows(
    collection: Collection,
    category_map: &CategoryMap,
    buckets: &[MetricBucket],
) -> Result<Vec<HistogramRow>> {
    if collection.is_flat() {
        let category = category_map
            .categories()
            .first()
            .ok_or_else(|| anyhow!("'{}' map has no category", category_map.name()))?;
        Ok(aggregate_flat(buckets, category))
    } else {
        aggregate(buckets, category_map, category_map.categories())
    }
}

/// Per-category totals across all rows, in `categories` order.
pub fn totals(rows: &[HistogramRow], categories: &[String]) -> Vec<(String, f64)> {
    categories
        .iter()
        .map(|c| {
            let sum = rows.iter().filter_map(|r| r.get(c)).sum();
            (c.clone(), sum)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_matches_number_coercion() {
        assert_eq!(parse_number("3"), 3.0);
        assert_eq!(parse_number(" 12 "), 12.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
        assert_eq!(parse_number("1.5"), 1.5);
        assert_eq!(parse_number("-4"), -4.0);
        assert_eq!(parse_number("+4"), 4.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("0x1f"), 31.0);
        assert_eq!(parse_number("0b101"), 5.0);
        assert_eq!(parse_number("0o17"), 15.0);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_parse_number_malformed_is_nan() {
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("12abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert!(parse_number("infinity").is_nan());
        assert!(parse_number("0x").is_nan());
        assert!(parse_number("0xzz").is_nan());
        assert!(parse_number("--1").is_nan());
    }

    #[test]
    fn test_parse_number_trims_number_whitespace_only() {
        assert_eq!(parse_number("\u{feff}5"), 5.0);
        assert_eq!(parse_number("\u{a0}7\u{3000}"), 7.0);
        assert_eq!(parse_number("\t\n2\u{2028}"), 2.0);
        assert!(parse_number("\u{85}5").is_nan());
        assert!(parse_number("5\u{85}").is_nan());
    }

    #[test]
    fn test_zeroed_row_has_all_categories() {
        let cats = vec!["A".to_string(), "B".to_string()];
        let row = HistogramRow::zeroed("1", &cats);
        assert_eq!(row.get("A"), Some(0.0));
        assert_eq!(row.get("B"), Some(0.0));
        assert_eq!(row.get("C"), None);
        assert_eq!(row.total(), 0.0);
    }

    #[test]
    fn test_zeroed_row_collapses_repeated_categories() {
        let cats = vec!["Messages".to_string(), "Messages".to_string()];
        let row = HistogramRow::zeroed("1", &cats);
        assert_eq!(row.values().len(), 1);
        let s = serde_json::to_string(&row).unwrap();
        assert_eq!(s, r#"{"timestamp":"1","Messages":0.0}"#);

        let map = CategoryMap::new("m")
            .with_entry("message_confirmed", "Messages", "#E3A33F", "Message Confirmed");
        let buckets = vec![MetricBucket::with_types("1", &[("message_confirmed", "2")])];
        let rows = aggregate(&buckets, &map, &cats).unwrap();
        assert_eq!(rows[0].values(), &[("Messages".to_string(), 2.0)]);
    }

    #[test]
    fn test_row_serializes_flat_with_timestamp_first() {
        let cats = vec!["Blockchain".to_string(), "Messages".to_string()];
        let mut row = HistogramRow::zeroed("100", &cats);
        row.add("Messages", 3.0);
        let s = serde_json::to_string(&row).unwrap();
        assert_eq!(s, r#"{"timestamp":"100","Blockchain":0.0,"Messages":3.0}"#);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let rows = aggregate_flat(&[MetricBucket::flat("1", "oops")], "Blockchain Events");
        let s = serde_json::to_string(&rows[0]).unwrap();
        assert_eq!(s, r#"{"timestamp":"1","Blockchain Events":null}"#);
    }
}
