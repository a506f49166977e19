use std::fmt;
use std::sync::Arc;

use civicwatch_auth::{AuthGate, CredentialStore, IdentityResolver, TokenCodec, UserLookup};
use civicwatch_config::{CorsConfig, DatabaseConfig, JwtConfig, RateLimitSettings};
use civicwatch_db::{PgUserStore, init_db_pool};
use civicwatch_ratelimit::RateLimiter;

/// One limiter per scope. `general` covers every `/api` route, `auth`
/// additionally covers the login endpoint.
#[derive(Clone, Debug)]
pub struct RateLimiters {
    pub general: Arc<RateLimiter>,
    pub auth: Arc<RateLimiter>,
}

impl RateLimiters {
    pub fn in_memory(settings: &RateLimitSettings) -> Self {
        Self {
            general: Arc::new(RateLimiter::in_memory(settings.general)),
            auth: Arc::new(RateLimiter::in_memory(settings.auth)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub gate: AuthGate,
    pub credentials: Arc<dyn CredentialStore>,
    pub rate_limiters: RateLimiters,
    pub rate_limit_settings: RateLimitSettings,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        jwt_config: &JwtConfig,
        users: Arc<dyn UserLookup>,
        credentials: Arc<dyn CredentialStore>,
        rate_limit_settings: RateLimitSettings,
        cors_config: CorsConfig,
    ) -> Self {
        let gate = AuthGate::new(TokenCodec::new(jwt_config), IdentityResolver::new(users));

        Self {
            gate,
            credentials,
            rate_limiters: RateLimiters::in_memory(&rate_limit_settings),
            rate_limit_settings,
            cors_config,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        self.gate.codec()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gate)
            .field("rate_limiters", &self.rate_limiters)
            .field("rate_limit_settings", &self.rate_limit_settings)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

/// Loads configuration from the environment and connects the user store.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env()?;
    let database_config = DatabaseConfig::from_env()?;

    let pool = init_db_pool(&database_config).await?;
    let users = Arc::new(PgUserStore::new(pool));

    Ok(AppState::new(
        &jwt_config,
        users.clone(),
        users,
        RateLimitSettings::from_env(),
        CorsConfig::from_env(),
    ))
}
