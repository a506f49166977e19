//! Rate limiting configuration for API endpoints.
//!
//! Limits are sliding windows: at most `limit` requests per client within any
//! trailing `window_ms` milliseconds.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: master switch (default: true)
//! - `RATE_LIMIT_TRUST_PROXY`: key clients by the first `X-Forwarded-For` entry (default: false)
//! - `RATE_LIMIT_GENERAL_LIMIT`: requests per window for `/api` routes (default: 100)
//! - `RATE_LIMIT_GENERAL_WINDOW_MS`: window for `/api` routes (default: 60000)
//! - `RATE_LIMIT_AUTH_LIMIT`: requests per window for login (default: 10)
//! - `RATE_LIMIT_AUTH_WINDOW_MS`: window for login (default: 60000)

use std::env;
use std::time::Duration;

use crate::parse_or;

/// A single sliding-window limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per window.
    pub limit: u32,
    /// Trailing window length in milliseconds.
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window_ms: 60_000,
        }
    }
}

impl RateLimitConfig {
    pub fn new(limit: u32, window_ms: u64) -> Self {
        Self { limit, window_ms }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Window length rounded up to whole seconds, for `Retry-After`.
    pub fn window_secs_ceil(&self) -> u64 {
        self.window_ms.div_ceil(1000)
    }
}

/// Limits applied by the HTTP layer.
///
/// `general` guards every `/api` route; `auth` is stacked on top of it for
/// credential endpoints, where brute force is the concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub trust_proxy: bool,
    pub general: RateLimitConfig,
    pub auth: RateLimitConfig,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            trust_proxy: false,
            general: RateLimitConfig::default(),
            auth: RateLimitConfig::new(10, 60_000),
        }
    }
}

impl RateLimitSettings {
    /// Falls back to defaults for any variable that is unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_source<F>(source: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let general = RateLimitConfig {
            limit: parse_or(&source, "RATE_LIMIT_GENERAL_LIMIT", defaults.general.limit),
            window_ms: parse_or(
                &source,
                "RATE_LIMIT_GENERAL_WINDOW_MS",
                defaults.general.window_ms,
            ),
        };
        let auth = RateLimitConfig {
            limit: parse_or(&source, "RATE_LIMIT_AUTH_LIMIT", defaults.auth.limit),
            window_ms: parse_or(&source, "RATE_LIMIT_AUTH_WINDOW_MS", defaults.auth.window_ms),
        };

        Self {
            enabled: parse_or(&source, "RATE_LIMIT_ENABLED", defaults.enabled),
            trust_proxy: parse_or(&source, "RATE_LIMIT_TRUST_PROXY", defaults.trust_proxy),
            general,
            auth,
        }
    }
}
