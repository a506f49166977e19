//! # CivicWatch Rate Limit
//!
//! Advisory per-client throttling using a sliding window: a client may make at
//! most `limit` requests within any trailing `window_ms` milliseconds.
//!
//! - [`store`]: the injectable [`RateLimitStore`] and its in-memory implementation
//! - [`clock`]: millisecond time source, swappable in tests
//! - [`limiter`]: [`RateLimiter::admit`], the admission decision
//!
//! # Scope
//!
//! There is no burst credit, no distributed coordination and no persistence
//! across restarts. [`InMemoryRateLimitStore`] is process-local; a
//! multi-instance deployment needs a shared [`RateLimitStore`].
//!
//! # Example
//!
//! ```ignore
//! use civicwatch_config::RateLimitConfig;
//! use civicwatch_ratelimit::{Decision, RateLimiter};
//!
//! let limiter = RateLimiter::in_memory(RateLimitConfig::default());
//! match limiter.admit("203.0.113.7").await {
//!     Decision::Admit { .. } => { /* continue */ }
//!     Decision::Reject => { /* 429 */ }
//! }
//! ```

pub mod clock;
pub mod limiter;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{Decision, RateLimiter};
pub use store::{InMemoryRateLimitStore, RateLimitStore, StoreError};
