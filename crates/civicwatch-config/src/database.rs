use std::env;
use std::fmt;

use crate::error::ConfigError;
use crate::parse_or;

/// PostgreSQL connection settings.
///
/// - `DATABASE_URL`: connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = source("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            url,
            max_connections: parse_or(&source, "DATABASE_MAX_CONNECTIONS", 10),
        })
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connection strings usually embed a password.
        let host = self.url.rsplit('@').next().unwrap_or_default();
        f.debug_struct("DatabaseConfig")
            .field("host", &host)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
