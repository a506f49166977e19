//! Token signing configuration.
//!
//! - `JWT_SECRET`: HMAC signing secret (required)
//! - `JWT_ACCESS_EXPIRY`: token lifetime in seconds (default: 604800, 7 days)

use std::env;
use std::fmt;

use crate::error::ConfigError;
use crate::parse_or;

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 604_800;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds, measured from the issued-at claim.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    /// Loads the signing configuration from the process environment.
    ///
    /// A missing or blank `JWT_SECRET` is an error: the server must not start
    /// with a guessable signing key.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = source("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_token_expiry =
            parse_or(&source, "JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY);
        if access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_ACCESS_EXPIRY",
                reason: "must be a positive number of seconds".to_string(),
            });
        }

        Ok(Self {
            secret,
            access_token_expiry,
        })
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .finish()
    }
}
