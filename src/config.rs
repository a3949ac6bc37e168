use anyhow::{anyhow, Result};
use clap::Parser;

use crate::categories::Collection;
use crate::theme::Theme;
use crate::time_range::TimeRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Tui,
    Table,
    Json,
}

impl std::str::FromStr for Output {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tui" | "chart" => Ok(Output::Tui),
            "table" | "text" => Ok(Output::Table),
            "json" => Ok(Output::Json),
            _ => Err(anyhow!("Invalid output '{s}'. Valid options: tui, table, json")),
        }
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Tui => write!(f, "tui"),
            Output::Table => write!(f, "table"),
            Output::Json => write!(f, "json"),
        }
    }
}

/// ffx - FireFly network histogram explorer
///
/// Fetches activity histograms from a FireFly node and renders them as a
/// grouped bar chart. Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "ffx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FireFly network histogram explorer", long_about = None)]
pub struct CliArgs {
    /// FireFly API base URL
    #[arg(long, env = "FF_API_URL")]
    pub api_url: Option<String>,

    /// Namespace to query
    #[arg(short, long, env = "FF_NAMESPACE")]
    pub namespace: Option<String>,

    /// Collection: events, messages, operations, transactions, blockchainevents
    #[arg(short, long, env = "COLLECTION", value_parser = clap::value_parser!(Collection))]
    pub collection: Option<Collection>,

    /// Time window: 1h, 24h, 7d, 30d
    #[arg(short, long, env = "RANGE", value_parser = clap::value_parser!(TimeRange))]
    pub range: Option<TimeRange>,

    /// Number of histogram buckets (1-100)
    #[arg(short, long, env = "BUCKETS")]
    pub buckets: Option<u32>,

    /// HTTP request timeout in milliseconds (1000-60000)
    #[arg(long, env = "RPC_TIMEOUT_MS")]
    pub rpc_timeout_ms: Option<u64>,

    /// Retry attempts for transient HTTP failures (0-10)
    #[arg(long, env = "RPC_RETRIES")]
    pub rpc_retries: Option<u32>,

    /// Color theme: nord, dos-blue, amber-crt, green-phosphor
    #[arg(long, env = "THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Output mode: tui, table, json
    #[arg(short, long, env = "OUTPUT", value_parser = clap::value_parser!(Output))]
    pub output: Option<Output>,

    /// Re-fetch the chart every N seconds in TUI mode (5-3600)
    #[arg(long, env = "REFRESH_SECS")]
    pub refresh_secs: Option<u64>,

    /// Write logs to this file (TUI mode logs nowhere otherwise)
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub namespace: String,
    pub collection: Collection,
    pub range: TimeRange,
    pub buckets: u32,
    pub rpc_timeout_ms: u64,
    pub rpc_retries: u32,
    pub theme: Theme,
    pub output: Output,
    pub refresh_secs: Option<u64>,
    pub log_file: Option<String>,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

/// Apply defaults and validation to parsed arguments
pub fn from_args(args: CliArgs) -> Result<Config> {
    let api_url = args
        .api_url
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
        .trim_end_matches('/')
        .to_string();
    validate_url(&api_url, "FF_API_URL")?;

    let namespace = args.namespace.unwrap_or_else(|| "default".to_string());
    if namespace.trim().is_empty() {
        return Err(anyhow!("FF_NAMESPACE cannot be empty"));
    }

    let buckets = validate_in_range(args.buckets.unwrap_or(24), 1, 100, "BUCKETS")?;
    let rpc_timeout_ms =
        validate_in_range(args.rpc_timeout_ms.unwrap_or(8000), 1000, 60000, "RPC_TIMEOUT_MS")?;
    let rpc_retries = validate_in_range(args.rpc_retries.unwrap_or(2), 0, 10, "RPC_RETRIES")?;
    let refresh_secs = args
        .refresh_secs
        .map(|s| validate_in_range(s, 5, 3600, "REFRESH_SECS"))
        .transpose()?;

    Ok(Config {
        api_url,
        namespace,
        collection: args.collection.unwrap_or(Collection::Events),
        range: args.range.unwrap_or_default(),
        buckets,
        rpc_timeout_ms,
        rpc_retries,
        theme: args.theme.unwrap_or_default(),
        output: args.output.unwrap_or(Output::Tui),
        refresh_secs,
        log_file: args.log_file,
    })
}

impl Config {
    pub fn log_summary(&self) {
        log::info!("ffx configuration:");
        log::info!("  API URL: {}", self.api_url);
        log::info!("  Namespace: {}", self.namespace);
        log::info!("  Collection: {}", self.collection);
        log::info!("  Range: {} ({} buckets)", self.range, self.buckets);
        log::info!("  Timeout: {}ms, retries: {}", self.rpc_timeout_ms, self.rpc_retries);
        log::info!("  Output: {}, theme: {}", self.output, self.theme);
        if let Some(secs) = self.refresh_secs {
            log::info!("  Auto refresh: every {secs}s");
        }
    }
}
