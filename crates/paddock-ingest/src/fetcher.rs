//! Rate-limited, paginated access to the upstream API
//!
//! [`ApiClient::fetch_all`] turns an endpoint into a lazy stream of record pages.
//! Requests are strictly sequential and spaced by at least the configured delay.
//! Failures never surface to the caller: a page that cannot be fetched after the
//! retry budget ends the stream, and whatever was collected before is kept.

use crate::api::{extract_table, Page};
use crate::config::ApiConfig;
use crate::error::{IngestError, Result};
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Enforces a minimum interval between consecutive requests
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: std::time::Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: std::time::Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request may be issued and record it as issued
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// HTTP client for the Ergast-compatible API
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    limiter: RateLimiter,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("paddock-ingest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit_delay()),
            client,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `{base}/{endpoint}.json`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_matches('/')
        )
    }

    /// Lazily fetch every page of `endpoint`
    ///
    /// Each item is the record list of one page, read from `MRData.<table>`.
    /// When the response reports `MRData.total` the stream ends once the offset
    /// passes it; otherwise it ends on the first page shorter than `page_size`.
    /// An empty page, a malformed payload or an exhausted retry budget also end it.
    pub fn fetch_all<'a>(
        &'a self,
        endpoint: &'a str,
        table: &'a str,
        page_size: u32,
    ) -> impl Stream<Item = Vec<Value>> + 'a {
        let page_size = page_size.max(1);

        stream::unfold(Some(0u64), move |next_offset| async move {
            let Some(offset) = next_offset else {
                return None;
            };
            let Some(page) = self.fetch_page(endpoint, table, page_size, offset).await else {
                return None;
            };

            if page.items.is_empty() {
                debug!(endpoint, offset, "Empty page, pagination complete");
                return None;
            }

            let advanced = offset + u64::from(page_size);
            let exhausted = match page.total {
                Some(total) => advanced >= total,
                None => page.items.len() < page_size as usize,
            };

            Some((page.items, (!exhausted).then_some(advanced)))
        })
    }

    /// Collect every record of `endpoint` into one list
    pub async fn fetch_records(&self, endpoint: &str, table: &str) -> Vec<Value> {
        let records: Vec<Value> = self
            .fetch_all(endpoint, table, self.config.page_size)
            .concat()
            .await;

        info!(endpoint, records = records.len(), "Fetched endpoint");
        records
    }

    /// Fetch one page; `None` when the page could not be retrieved
    ///
    /// A payload that is not JSON is treated as an empty page.
    async fn fetch_page(
        &self,
        endpoint: &str,
        table: &str,
        limit: u32,
        offset: u64,
    ) -> Option<Page> {
        match self.request_with_retry(endpoint, limit, offset).await {
            Ok(payload) => Some(extract_table(&payload, table)),
            Err(IngestError::Json(e)) => {
                warn!(endpoint, offset, error = %e, "Malformed payload, treating page as empty");
                Some(Page::default())
            },
            Err(e) => {
                warn!(
                    endpoint,
                    offset,
                    error = %e,
                    "Giving up on endpoint, keeping records fetched so far"
                );
                None
            },
        }
    }

    /// Request with bounded retries and exponential backoff
    ///
    /// Transport errors, 429 and 5xx are retried; other statuses and decode
    /// errors are returned immediately.
    async fn request_with_retry(&self, endpoint: &str, limit: u32, offset: u64) -> Result<Value> {
        let attempts = self.config.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.request(endpoint, limit, offset).await {
                Ok(payload) => return Ok(payload),
                Err(e) if attempt < attempts && is_retryable(&e) => {
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(
                        endpoint,
                        offset,
                        attempt,
                        attempts,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Single rate-limited request
    async fn request(&self, endpoint: &str, limit: u32, offset: u64) -> Result<Value> {
        let url = self.endpoint_url(endpoint);
        self.limiter.acquire().await;

        debug!(url = %url, limit, offset, "GET");
        let response = self
            .client
            .get(&url)
            .query(&[("limit", u64::from(limit)), ("offset", offset)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn is_retryable(error: &IngestError) -> bool {
    match error {
        IngestError::Http(_) => true,
        IngestError::Status { status, .. } => StatusCode::from_u16(*status)
            .map(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let client = ApiClient::new(ApiConfig {
            base_url: "http://localhost:9/ergast/f1/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();

        assert_eq!(client.endpoint_url("circuits"), "http://localhost:9/ergast/f1/circuits.json");
        assert_eq!(
            client.endpoint_url("/2024/results/"),
            "http://localhost:9/ergast/f1/2024/results.json"
        );
    }

    #[test]
    fn test_retryable_statuses() {
        let status = |code| IngestError::Status {
            status: code,
            url: String::new(),
        };
        assert!(is_retryable(&status(503)));
        assert!(is_retryable(&status(429)));
        assert!(!is_retryable(&status(404)));
        assert!(!is_retryable(&IngestError::config("x")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
