//! CivicWatch Observability
//!
//! Provides configurable observability features including:
//! - Structured logging to the console and to daily-rotated JSON files
//! - Per-request logging with a generated request id
//! - Metrics collection via Prometheus, including auth and rate limit counters
//!
//! This module can be enabled or disabled at compile time via the `observability` feature flag.
//! At runtime, observability can be further controlled via the `OBSERVABILITY_ENABLED` environment variable.
//!
//! # Features
//!
//! - `observability` (default): Enables file logging, request logging and metrics
//!
//! # Examples
//!
//! ```no_run
//! use civicwatch_observability::{init_basic_console_logging, init_tracing, is_observability_enabled};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     if is_observability_enabled() {
//!         init_tracing()?;
//!     } else {
//!         init_basic_console_logging();
//!     }
//!     Ok(())
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{REQUEST_ID_HEADER, init_tracing, is_observability_enabled, logging_middleware};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, metrics_app, metrics_middleware, track_anonymous_fallback, track_auth_rejection,
    track_login, track_rate_limited, track_token_issued,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    pub const REQUEST_ID_HEADER: &str = "x-request-id";

    /// Stand-in for the Prometheus handle; never constructed.
    #[derive(Clone, Debug)]
    pub enum PrometheusHandle {}

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_tracing() -> anyhow::Result<()> {
        super::init_basic_console_logging();
        Ok(())
    }

    pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
        Ok(None)
    }

    pub fn metrics_app(handle: PrometheusHandle) -> Router {
        match handle {}
    }

    pub fn track_auth_rejection(_code: &str) {}
    pub fn track_anonymous_fallback(_reason: &str) {}
    pub fn track_rate_limited(_scope: &str) {}
    pub fn track_token_issued() {}
    pub fn track_login(_status: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
