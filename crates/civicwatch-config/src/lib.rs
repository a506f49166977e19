//! # CivicWatch Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and expiry horizon
//! - [`rate_limit`]: sliding-window limits for general and auth endpoints
//! - [`cors`]: allowed origins
//! - [`database`]: PostgreSQL connection string and pool size
//! - [`server`]: bind address
//!
//! Every loader has a `from_env` entry point and a `from_source` variant that
//! reads from an arbitrary key lookup, which keeps parsing testable without
//! touching process state.
//!
//! # Example
//!
//! ```ignore
//! use civicwatch_config::{CorsConfig, JwtConfig, RateLimitSettings, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let rate_limits = RateLimitSettings::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod error;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use jwt::JwtConfig;
pub use rate_limit::{RateLimitConfig, RateLimitSettings};
pub use server::ServerConfig;

/// Reads `key` through `source` and parses it, falling back to `default`
/// when the key is absent or unparsable.
pub(crate) fn parse_or<T, F>(source: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    source(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
