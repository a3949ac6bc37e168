//! REST client for the FireFly chart endpoints.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;

use crate::categories::{Collection, Taxonomy};
use crate::config::Config;
use crate::histogram::{build_rows, HistogramRow};
use crate::time_range::TimeRange;
use crate::types::MetricBucket;

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("[api] falling back to default client: {e}");
                reqwest::Client::new()
            })
    })
}

/// `{base}/api/v1/namespaces/{ns}/charts/histogram/{collection}?startTime=..&endTime=..&buckets=..`
pub fn histogram_url(
    base: &str,
    namespace: &str,
    collection: Collection,
    start: i64,
    end: i64,
    buckets: u32,
) -> String {
    format!(
        "{}/api/v1/namespaces/{}/charts/histogram/{}?startTime={}&endTime={}&buckets={}",
        base.trim_end_matches('/'),
        urlencoding::encode(namespace),
        collection.path_segment(),
        start,
        end,
        buckets
    )
}

/// Statuses worth another attempt
fn is_transient(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// GET and decode JSON, retrying transient failures with a short linear backoff.
pub async fn get_json<T: DeserializeOwned>(url: &str, timeout_ms: u64, retries: u32) -> Result<T> {
    get_json_with(http_client(), url, timeout_ms, retries).await
}

async fn get_json_with<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    timeout_ms: u64,
    retries: u32,
) -> Result<T> {
    let mut attempt = 0u32;
    loop {
        log::debug!("[api] GET {url} (attempt {})", attempt + 1);
        let res = client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(e) if attempt < retries && (e.is_timeout() || e.is_connect()) => {
                attempt += 1;
                log::warn!("[api] request failed ({e}), retrying");
                tokio::time::sleep(Duration::from_millis(150 * attempt as u64)).await;
                continue;
            }
            Err(e) => return Err(anyhow!("Failed to reach {url}: {e}")),
        };

        let status = res.status();
        if status.is_success() {
            return res
                .json::<T>()
                .await
                .with_context(|| format!("Failed to parse response from {url}"));
        }
        if is_transient(status.as_u16()) && attempt < retries {
            attempt += 1;
            log::warn!("[api] http {status}, retrying");
            tokio::time::sleep(Duration::from_millis(150 * attempt as u64)).await;
            continue;
        }
        let body = res.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(anyhow!("API error ({status}): {body}"));
    }
}

/// Fetch raw histogram buckets for `collection` over `range`, ending now.
pub async fn fetch_histogram(
    cfg: &Config,
    collection: Collection,
    range: TimeRange,
) -> Result<Vec<MetricBucket>> {
    let (start, end) = range.bounds(chrono::Utc::now());
    let url = histogram_url(&cfg.api_url, &cfg.namespace, collection, start, end, cfg.buckets);
    log::info!("[api] Fetching {collection} histogram ({range})");
    let buckets: Vec<MetricBucket> = get_json(&url, cfg.rpc_timeout_ms, cfg.rpc_retries).await?;
    log::info!("[api] Got {} buckets", buckets.len());
    Ok(buckets)
}

/// Fetch and aggregate with the collection's category map.
pub async fn fetch_rows(
    cfg: &Config,
    taxonomy: &Taxonomy,
    collection: Collection,
    range: TimeRange,
) -> Result<Vec<HistogramRow>> {
    let buckets = fetch_histogram(cfg, collection, range).await?;
    build_rows(collection, taxonomy.map(collection), &buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local HTTP server answering each connection with the next canned
    /// `(status, body)`; the last one repeats. Returns the URL and a hit counter.
    async fn canned_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[n.min(responses.len() - 1)];

                // drain the request head before answering
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(read) => head.extend_from_slice(&chunk[..read]),
                    }
                }

                let reason = if status == 200 { "OK" } else { "Service Unavailable" };
                let reply = format!(
                    "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        (format!("http://{addr}/charts/histogram/events"), hits)
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    const BUCKETS: &str = r#"[{"timestamp":"1","count":"2","types":[]}]"#;

    #[tokio::test]
    async fn test_transient_status_is_retried() {
        let (url, hits) = canned_server(vec![(503, "busy"), (200, BUCKETS)]).await;
        let buckets: Vec<MetricBucket> =
            get_json_with(&local_client(), &url, 2_000, 3).await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, "2");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (url, hits) = canned_server(vec![(503, "backend down")]).await;
        let err = get_json_with::<Vec<MetricBucket>>(&local_client(), &url, 2_000, 1)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("503"), "unexpected error: {msg}");
        assert!(msg.contains("backend down"), "unexpected error: {msg}");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_reported() {
        let (url, hits) = canned_server(vec![(200, "<html>not json</html>")]).await;
        let err = get_json_with::<Vec<MetricBucket>>(&local_client(), &url, 2_000, 3)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse"), "unexpected error: {err:#}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_histogram_url() {
        let url = histogram_url(
            "http://localhost:5000/",
            "default",
            Collection::Operations,
            100,
            200,
            24,
        );
        assert_eq!(
            url,
            "http://localhost:5000/api/v1/namespaces/default/charts/histogram/operations\
             ?startTime=100&endTime=200&buckets=24"
        );
    }

    #[test]
    fn test_namespace_is_encoded() {
        let url = histogram_url("http://h", "my ns", Collection::Events, 0, 1, 1);
        assert!(url.contains("/namespaces/my%20ns/"));
    }

    #[test]
    fn test_transient_statuses() {
        for s in [429, 500, 502, 503, 504] {
            assert!(is_transient(s));
        }
        assert!(!is_transient(404));
        assert!(!is_transient(400));
    }
}
