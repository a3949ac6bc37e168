use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Chart window presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    LastHour,
    Last24Hours,
    Last7Days,
    Last30Days,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::LastHour,
        TimeRange::Last24Hours,
        TimeRange::Last7Days,
        TimeRange::Last30Days,
    ];

    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::LastHour => Duration::hours(1),
            TimeRange::Last24Hours => Duration::hours(24),
            TimeRange::Last7Days => Duration::days(7),
            TimeRange::Last30Days => Duration::days(30),
        }
    }

    /// `(startTime, endTime)` in unix seconds, ending at `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (i64, i64) {
        let end = now.timestamp();
        (end - self.duration().num_seconds(), end)
    }

    /// Labels for windows longer than a day need the date.
    pub fn spans_days(&self) -> bool {
        self.duration() > Duration::hours(24)
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Last24Hours
    }
}

impl std::str::FromStr for TimeRange {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1h" | "hour" => Ok(TimeRange::LastHour),
            "24h" | "1d" | "day" => Ok(TimeRange::Last24Hours),
            "7d" | "1w" | "week" => Ok(TimeRange::Last7Days),
            "30d" | "month" => Ok(TimeRange::Last30Days),
            _ => Err(anyhow!("Invalid range '{s}'. Valid options: 1h, 24h, 7d, 30d")),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::LastHour => write!(f, "1h"),
            TimeRange::Last24Hours => write!(f, "24h"),
            TimeRange::Last7Days => write!(f, "7d"),
            TimeRange::Last30Days => write!(f, "30d"),
        }
    }
}
