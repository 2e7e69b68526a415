//! REST client for the Kalshi public trade API.
//!
//! Read-only market and series lookups, no auth. Handles cursor
//! pagination, client-side rate limiting, and bounded retry with
//! exponential backoff on 429/5xx. Per-event failures are collected
//! into the fetch report rather than aborting the snapshot.

use std::time::Duration;

use tracing::{debug, info, warn};

use common::{Error, MarketInfo, MarketsResponse, SeriesResponse};

use crate::rate_limit::RateLimiter;
use crate::urls;

const PAGE_LIMIT: u32 = 1000;
const MAX_RETRIES: u32 = 5;
const BACKOFF_BASE_SECS: f64 = 0.5;

/// A failed per-event market fetch.
#[derive(Debug)]
pub struct FetchFailure {
    pub event_ticker: String,
    pub error: Error,
}

/// Outcome of a multi-event snapshot pull: everything that fetched,
/// plus everything that didn't.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub markets: Vec<MarketInfo>,
    pub failures: Vec<FetchFailure>,
}

/// Async client for the public Kalshi elections API.
#[derive(Debug, Clone)]
pub struct KalshiPublicClient {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl KalshiPublicClient {
    /// Create a new client against `base_url`
    /// (e.g. `https://api.elections.kalshi.com/trade-api/v2`).
    pub fn new(base_url: &str, requests_per_second: u32) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(25))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::with_limit(requests_per_second),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Rate-limited GET with bounded retry on 429/5xx.
    async fn get_with_retry(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let mut attempt = 0;
        loop {
            self.limiter.wait_read().await;

            let resp = self
                .client
                .get(self.url(path))
                .query(query)
                .send()
                .await
                .map_err(|e| Error::Http(e.to_string()))?;

            let status = resp.status().as_u16();
            if status == 200 {
                return Ok(resp);
            }

            let retryable = matches!(status, 429 | 500 | 502 | 503 | 504);
            if retryable && attempt < MAX_RETRIES {
                let wait = BACKOFF_BASE_SECS * f64::from(1u32 << attempt);
                debug!("GET {} -> {}, retry in {:.1}s", path, status, wait);
                tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                attempt += 1;
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            return Err(Error::KalshiApi {
                status,
                message: body.chars().take(300).collect(),
            });
        }
    }

    /// Fetch every market under one event, following cursors.
    pub async fn markets_for_event(&self, event_ticker: &str) -> Result<Vec<MarketInfo>, Error> {
        let mut all_markets = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("event_ticker", event_ticker.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.clone()));
            }

            let resp = self.get_with_retry("/markets", &query).await?;
            let mut body: MarketsResponse = resp
                .json()
                .await
                .map_err(|e| Error::Http(e.to_string()))?;

            // Tag each market with its owning event before collecting.
            for m in &mut body.markets {
                m.event_ticker = event_ticker.to_string();
            }
            all_markets.extend(body.markets);

            match body.cursor {
                Some(c) if !c.is_empty() => cursor = Some(c),
                _ => break,
            }
        }

        Ok(all_markets)
    }

    /// Pull markets for many events, collecting per-event failures
    /// instead of aborting.
    pub async fn fetch_event_markets(&self, event_tickers: &[String]) -> FetchReport {
        let total = event_tickers.len();
        let mut report = FetchReport::default();

        for (i, et) in event_tickers.iter().enumerate() {
            match self.markets_for_event(et).await {
                Ok(markets) => report.markets.extend(markets),
                Err(error) => {
                    warn!("failed to fetch markets for {}: {}", et, error);
                    report.failures.push(FetchFailure {
                        event_ticker: et.clone(),
                        error,
                    });
                }
            }
            if (i + 1) % 50 == 0 || i + 1 == total {
                info!(
                    "[{}/{}] events fetched, {} contracts so far",
                    i + 1,
                    total,
                    report.markets.len()
                );
            }
        }

        report
    }

    /// Build the public market URL for an event by fetching its series
    /// title. Returns `None` on any failure — the URL is cosmetic.
    pub async fn series_url(&self, event_ticker: &str) -> Option<String> {
        let series = urls::series_ticker(event_ticker);
        let path = format!("/series/{}", series);

        let resp = match self.get_with_retry(&path, &[]).await {
            Ok(r) => r,
            Err(e) => {
                debug!("series lookup failed for {}: {}", series, e);
                return None;
            }
        };
        let body: SeriesResponse = match resp.json().await {
            Ok(b) => b,
            Err(e) => {
                debug!("series parse failed for {}: {}", series, e);
                return None;
            }
        };

        let slug = urls::slugify(&body.series.title);
        Some(urls::market_url(series, &slug, event_ticker))
    }
}
