use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::{
    api::fetch_rows,
    categories::{Collection, Taxonomy},
    config::Config,
    time_range::TimeRange,
    types::AppEvent,
};

/// Serve chart refresh requests until either channel closes.
///
/// Each request is fetched once. With `refresh_secs` set, the last request is
/// fetched again on that interval.
pub async fn run_source(
    cfg: Config,
    taxonomy: Arc<Taxonomy>,
    mut requests: UnboundedReceiver<(Collection, TimeRange)>,
    tx: UnboundedSender<AppEvent>,
) -> Result<()> {
    log::info!("🚀 Histogram source started - endpoint: {}", cfg.api_url);

    let mut ticker = interval(Duration::from_secs(cfg.refresh_secs.unwrap_or(3600)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick fires immediately
    ticker.tick().await;

    let mut last: Option<(Collection, TimeRange)> = None;

    loop {
        let (collection, range) = tokio::select! {
            req = requests.recv() => match req {
                Some(req) => req,
                None => {
                    log::info!("Request channel closed, stopping source");
                    return Ok(());
                }
            },
            _ = ticker.tick(), if cfg.refresh_secs.is_some() && last.is_some() => match last {
                Some(req) => {
                    log::debug!("⏰ Auto refresh");
                    req
                }
                None => continue,
            },
        };
        last = Some((collection, range));

        let event = match fetch_rows(&cfg, &taxonomy, collection, range).await {
            Ok(rows) => {
                log::info!("🔔 {collection} histogram ready ({} rows)", rows.len());
                AppEvent::Histogram {
                    collection,
                    range,
                    rows,
                }
            }
            Err(e) => {
                log::error!("❌ Fetch error: {e:?}");
                AppEvent::FetchFailed {
                    collection,
                    range,
                    error: format!("{e:#}"),
                }
            }
        };
        if tx.send(event).is_err() {
            log::info!("UI gone, stopping source");
            return Ok(());
        }
    }
}
