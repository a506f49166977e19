use axum::Json;
use axum::extract::State;

use civicwatch_core::AppError;
use civicwatch_ratelimit::RateLimiter;

use crate::middleware::role::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

use super::model::{LimiterStatus, RateLimitStatusResponse};

async fn limiter_status(limiter: &RateLimiter) -> Result<LimiterStatus, AppError> {
    let config = limiter.config();
    Ok(LimiterStatus {
        limit: config.limit,
        window_ms: config.window_ms,
        tracked_clients: limiter.tracked_clients().await?,
    })
}

/// Rate limiter configuration and load
#[utoipa::path(
    get,
    path = "/api/admin/rate-limits",
    responses(
        (status = 200, description = "Current limiter state", body = RateLimitStatusResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin (FORBIDDEN)", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn rate_limit_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<RateLimitStatusResponse>, AppError> {
    let settings = &state.rate_limit_settings;

    Ok(Json(RateLimitStatusResponse {
        enabled: settings.enabled,
        trust_proxy: settings.trust_proxy,
        general: limiter_status(&state.rate_limiters.general).await?,
        auth: limiter_status(&state.rate_limiters.auth).await?,
    }))
}
