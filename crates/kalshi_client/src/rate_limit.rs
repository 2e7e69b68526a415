//! Rate limiter for the Kalshi public API.
//!
//! The public tier allows 20 reads/sec; we default to half that.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

const DEFAULT_READS_PER_SEC: u32 = 10;

/// Token-bucket limiter for read requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    read_limiter: Arc<
        GovLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl RateLimiter {
    /// Create with the default public-tier budget.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_READS_PER_SEC)
    }

    /// Create with a custom per-second read limit (minimum 1).
    pub fn with_limit(reads_per_sec: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(reads_per_sec.max(1)).unwrap_or(NonZeroU32::MIN),
        );
        Self {
            read_limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a read slot is available.
    pub async fn wait_read(&self) {
        self.read_limiter.until_ready().await;
    }

    /// Try to acquire a read slot without waiting. Returns true if acquired.
    pub fn try_read(&self) -> bool {
        self.read_limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
