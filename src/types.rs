use serde::{Deserialize, Deserializer, Serialize};

use crate::categories::Collection;
use crate::histogram::HistogramRow;
use crate::time_range::TimeRange;

/// One `{type, count}` entry inside a histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricType {
    pub r#type: String,
    #[serde(deserialize_with = "count_as_string")]
    pub count: String,
}

/// One time interval as returned by `GET .../charts/histogram/{collection}`.
///
/// `types` is absent for the blockchain-event collection, which only carries a
/// flat `count` per bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBucket {
    pub timestamp: String,
    #[serde(default, deserialize_with = "count_as_string")]
    pub count: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<MetricType>>,
}

impl MetricBucket {
    pub fn flat(timestamp: impl Into<String>, count: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            count: count.into(),
            types: None,
        }
    }

    pub fn with_types(timestamp: impl Into<String>, types: &[(&str, &str)]) -> Self {
        Self {
            timestamp: timestamp.into(),
            count: String::new(),
            types: Some(
                types
                    .iter()
                    .map(|(t, c)| MetricType {
                        r#type: t.to_string(),
                        count: c.to_string(),
                    })
                    .collect(),
            ),
        }
    }
}

/// The backend sends counts as strings, but numeric counts are accepted too and
/// kept in their decimal string form.
fn count_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Count::deserialize(de)? {
        Count::Str(s) => s,
        Count::Int(n) => n.to_string(),
        Count::Float(f) => f.to_string(),
    })
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Histogram {
        collection: Collection,
        range: TimeRange,
        rows: Vec<HistogramRow>,
    },
    FetchFailed {
        collection: Collection,
        range: TimeRange,
        error: String,
    },
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_with_string_counts() {
        let raw = r#"{"timestamp":"100","count":"5",
            "types":[{"type":"message_confirmed","count":"3"}]}"#;
        let b: MetricBucket = serde_json::from_str(raw).unwrap();
        assert_eq!(b.timestamp, "100");
        assert_eq!(b.count, "5");
        let types = b.types.unwrap();
        assert_eq!(types[0].r#type, "message_confirmed");
        assert_eq!(types[0].count, "3");
    }

    #[test]
    fn test_bucket_with_numeric_counts() {
        let raw = r#"{"timestamp":"100","count":5,"types":[{"type":"x","count":2}]}"#;
        let b: MetricBucket = serde_json::from_str(raw).unwrap();
        assert_eq!(b.count, "5");
        assert_eq!(b.types.unwrap()[0].count, "2");
    }

    #[test]
    fn test_flat_bucket_has_no_types() {
        let raw = r#"{"timestamp":"2024-01-01T00:00:00Z","count":"7"}"#;
        let b: MetricBucket = serde_json::from_str(raw).unwrap();
        assert!(b.types.is_none());
        assert_eq!(b, MetricBucket::flat("2024-01-01T00:00:00Z", "7"));
    }
}
