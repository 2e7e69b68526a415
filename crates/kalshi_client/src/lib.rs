//! Public-API client for Kalshi election markets.
//!
//! Read-only: market and series lookups against the public trade API,
//! no authentication. Rate-limited and retried.

pub mod rate_limit;
pub mod rest;
pub mod urls;

pub use rate_limit::RateLimiter;
pub use rest::{FetchFailure, FetchReport, KalshiPublicClient};
pub use urls::{market_url, series_ticker, slugify};
