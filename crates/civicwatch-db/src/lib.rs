//! # CivicWatch DB
//!
//! Database pool and the PostgreSQL implementation of the user store.
//!
//! # Example
//!
//! ```ignore
//! use civicwatch_config::DatabaseConfig;
//! use civicwatch_db::{PgUserStore, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! let users = PgUserStore::new(pool);
//! ```

pub mod users;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use civicwatch_config::DatabaseConfig;

pub use sqlx::PgPool;
pub use users::PgUserStore;

/// Connects a PostgreSQL pool.
///
/// Call once at startup; the returned pool is cheaply cloneable.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the migrations under `migrations/` at the workspace root.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
