use chrono::{DateTime, TimeZone, Utc};

use crate::time_range::TimeRange;

/// Parse a bucket timestamp: RFC3339 or unix seconds.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    ts.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// Axis label for a bucket: `HH:MM` within a day, `MM-DD HH:MM` beyond.
/// Unparsable timestamps come back unchanged.
pub fn bucket_label(ts: &str, range: TimeRange) -> String {
    match parse_timestamp(ts) {
        Some(dt) if range.spans_days() => dt.format("%m-%d %H:%M").to_string(),
        Some(dt) => dt.format("%H:%M").to_string(),
        None => ts.to_string(),
    }
}

/// Compact count for legends and table cells.
pub fn format_count(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }
    const K: f64 = 1_000.0;
    const M: f64 = 1_000_000.0;
    const B: f64 = 1_000_000_000.0;

    let abs = n.abs();
    if abs >= B {
        format!("{:.1}B", n / B)
    } else if abs >= M {
        format!("{:.1}M", n / M)
    } else if abs >= 10.0 * K {
        format!("{:.1}K", n / K)
    } else if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_label() {
        assert_eq!(
            bucket_label("2024-03-01T09:05:00Z", TimeRange::Last24Hours),
            "09:05"
        );
        assert_eq!(
            bucket_label("2024-03-01T09:05:00.123456789Z", TimeRange::Last7Days),
            "03-01 09:05"
        );
        // 2024-03-01T00:00:00Z
        assert_eq!(bucket_label("1709251200", TimeRange::LastHour), "00:00");
        assert_eq!(bucket_label("bucket-1", TimeRange::LastHour), "bucket-1");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(42.0), "42");
        assert_eq!(format_count(9_999.0), "9999");
        assert_eq!(format_count(12_345.0), "12.3K");
        assert_eq!(format_count(2_500_000.0), "2.5M");
        assert_eq!(format_count(1.5), "1.50");
        assert_eq!(format_count(f64::NAN), "NaN");
    }
}
