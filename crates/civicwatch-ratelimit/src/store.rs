//! Storage for per-client request timestamps.

use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Per-client sliding windows.
///
/// Implementations own the timestamp sequences exclusively. The in-memory
/// store is the default; a shared store (Redis sorted sets, a SQL table) can be
/// dropped in for multi-instance deployments.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records a request for `key` at `now_ms` and returns how many requests,
    /// this one included, fall within `[now_ms - window_ms, now_ms]`.
    ///
    /// Timestamps older than the window are discarded as part of the call.
    async fn hit(&self, key: &str, now_ms: u64, window_ms: u64) -> Result<usize, StoreError>;

    /// Drops every key with no request inside the window ending at `now_ms`.
    /// Returns the number of keys removed.
    async fn evict_stale(&self, now_ms: u64, window_ms: u64) -> Result<usize, StoreError>;

    /// Number of clients currently tracked.
    async fn tracked_keys(&self) -> Result<usize, StoreError>;
}

/// Process-local store backed by a sharded concurrent map.
///
/// Each key's prune-then-append runs under that key's shard lock, so
/// concurrent requests from one client are counted exactly. Timestamps are
/// appended in order; pruning pops from the front.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: DashMap<String, VecDeque<u64>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, now_ms: u64, window_ms: u64) -> Result<usize, StoreError> {
        let threshold = now_ms.saturating_sub(window_ms);
        let mut window = self.windows.entry(key.to_owned()).or_default();

        while window.front().is_some_and(|&ts| ts < threshold) {
            window.pop_front();
        }
        window.push_back(now_ms);

        Ok(window.len())
    }

    async fn evict_stale(&self, now_ms: u64, window_ms: u64) -> Result<usize, StoreError> {
        let threshold = now_ms.saturating_sub(window_ms);
        let before = self.windows.len();

        self.windows
            .retain(|_, window| window.back().is_some_and(|&ts| ts >= threshold));

        Ok(before.saturating_sub(self.windows.len()))
    }

    async fn tracked_keys(&self) -> Result<usize, StoreError> {
        Ok(self.windows.len())
    }
}
