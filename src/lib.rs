//! ffx - FireFly network histogram explorer
//!
//! Fetches activity histograms (events, messages, operations, transactions,
//! blockchain events) from a FireFly node's REST API, folds per-type bucket
//! counts into chart categories, and renders them as a grouped bar chart in
//! the terminal, or as a table / JSON on stdout.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- --collection operations --range 7d
//! cargo run -- --output json
//! ```

// Core modules (no terminal or runtime requirements)
pub mod categories;
pub mod format;
pub mod histogram;
pub mod time_range;
pub mod types;

pub mod config;

// REST client
pub mod api;

// Theme and chart rendering
pub mod app;
pub mod chart;
pub mod theme;

// Background fetch loop (needs the full tokio runtime)
#[cfg(feature = "native")]
pub mod source;

// Re-export commonly used types
pub use categories::{CategoryDescriptor, CategoryMap, Collection, Taxonomy};
pub use config::{Config, Output};
pub use histogram::{aggregate, aggregate_flat, parse_number, HistogramRow};
pub use time_range::TimeRange;
pub use types::{AppEvent, MetricBucket, MetricType};
