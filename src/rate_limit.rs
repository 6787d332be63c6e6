//! Rate limiting for calls to the remote discovery and enrichment sources
//!
//! Token bucket per source. A rate of 0 disables limiting for that source.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;
use crate::config::RateLimitConfig;

/// Refills continuously at `rate` tokens per second and holds at most one
/// second worth of burst
#[derive(Debug)]
struct TokenBucket {
    rate: f64,
    available: f64,
    refreshed_at: Instant,
}

impl TokenBucket {
    fn new(requests_per_second: u32) -> Self {
        let rate = f64::from(requests_per_second);
        Self {
            rate,
            available: rate,
            refreshed_at: Instant::now(),
        }
    }

    /// Take one token at `now`, or return how long until one is due
    fn take(&mut self, now: Instant) -> Result<(), Duration> {
        let earned = now.saturating_duration_since(self.refreshed_at).as_secs_f64() * self.rate;
        self.available = (self.available + earned).min(self.rate);
        self.refreshed_at = now;

        if self.available >= 1.0 {
            self.available -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.available) / self.rate))
        }
    }
}

/// Limiter for one source, shared by every concurrent caller of that source
#[derive(Debug, Clone, Default)]
pub struct SharedRateLimiter {
    bucket: Option<Arc<Mutex<TokenBucket>>>,
}

impl SharedRateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            bucket: (requests_per_second > 0).then(|| Arc::new(Mutex::new(TokenBucket::new(requests_per_second)))),
        }
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Wait until the source may be called again. Callers queue on the
    /// bucket lock, so waits are served in arrival order.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };
        let mut bucket = bucket.lock().await;
        while let Err(wait) = bucket.take(Instant::now()) {
            debug!("Rate limiter waiting {:?} for token", wait);
            sleep(wait).await;
        }
    }
}

/// Rate limiters for each remote source used during a run
#[derive(Debug, Clone)]
pub struct RateLimitContext {
    pub search_limiter: SharedRateLimiter,
    pub autocomplete_limiter: SharedRateLimiter,
    pub organization_limiter: SharedRateLimiter,
    config: RateLimitConfig,
}

impl RateLimitContext {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            search_limiter: SharedRateLimiter::new(config.search_requests_per_second),
            autocomplete_limiter: SharedRateLimiter::new(config.autocomplete_requests_per_second),
            organization_limiter: SharedRateLimiter::new(config.organization_requests_per_second),
            config: config.clone(),
        }
    }

    pub fn log_config(&self) {
        let describe = |rps: u32| {
            if rps > 0 {
                format!("{} rps", rps)
            } else {
                "unlimited".to_string()
            }
        };

        debug!(
            "Rate limiting: search={}, autocomplete={}, organization={}",
            describe(self.config.search_requests_per_second),
            describe(self.config.autocomplete_requests_per_second),
            describe(self.config.organization_requests_per_second),
        );
    }
}
