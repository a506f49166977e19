//! Admission decisions over a [`RateLimitStore`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use civicwatch_config::RateLimitConfig;

use crate::clock::{Clock, SystemClock};
use crate::store::{InMemoryRateLimitStore, RateLimitStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit { remaining: u32 },
    Reject,
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admit { .. })
    }
}

/// Sliding-window limiter: at most `limit` requests per key in any trailing
/// `window_ms`.
///
/// Every call is recorded, rejected ones included, so a client that keeps
/// hammering past its limit stays throttled until it backs off for a full
/// window. Stale keys are evicted lazily from the request path, at most once
/// per window length.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    last_sweep_ms: AtomicU64,
}

impl RateLimiter {
    pub fn new(
        config: RateLimitConfig,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let last_sweep_ms = AtomicU64::new(clock.now_ms());
        Self {
            config,
            store,
            clock,
            last_sweep_ms,
        }
    }

    /// Process-local limiter on the system clock.
    pub fn in_memory(config: RateLimitConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRateLimitStore::new()),
            Arc::new(SystemClock),
        )
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Records a request from `key` and decides whether to let it through.
    ///
    /// The request is rejected when the in-window count, this request
    /// included, is greater than the limit: exactly `limit` requests pass and
    /// the next one is turned away. A store failure admits the request.
    pub async fn admit(&self, key: &str) -> Decision {
        let now_ms = self.clock.now_ms();
        self.sweep_if_due(now_ms).await;

        let limit = self.config.limit as usize;
        match self.store.hit(key, now_ms, self.config.window_ms).await {
            Ok(count) if count > limit => Decision::Reject,
            Ok(count) => Decision::Admit {
                remaining: (limit - count) as u32,
            },
            Err(err) => {
                warn!(error = %err, client = key, "Rate limit store failed, admitting request");
                Decision::Admit {
                    remaining: self.config.limit,
                }
            }
        }
    }

    pub async fn tracked_clients(&self) -> Result<usize, StoreError> {
        self.store.tracked_keys().await
    }

    async fn sweep_if_due(&self, now_ms: u64) {
        let last = self.last_sweep_ms.load(Ordering::Acquire);
        if now_ms.saturating_sub(last) < self.config.window_ms {
            return;
        }
        // One caller wins the sweep; the rest carry on.
        if self
            .last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        match self.store.evict_stale(now_ms, self.config.window_ms).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Evicted idle rate limit keys"),
            Err(err) => warn!(error = %err, "Rate limit eviction failed"),
        }
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("last_sweep_ms", &self.last_sweep_ms.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
