use axum::Json;
use axum::extract::State;
use utoipa::ToSchema;

use civicwatch_auth::Identity;
use civicwatch_core::AppError;

use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{LoginRequest, LoginResponse, SessionResponse};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable code, e.g. `NO_TOKEN`, `TokenExpiredError`
    pub code: Option<String>,
}

/// Login and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 429, description = "Too many login attempts (RATE_LIMITED)", body = ErrorResponse),
        (status = 503, description = "User store unavailable (AUTH_UNAVAILABLE)", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(state.credentials.as_ref(), state.codec(), dto).await?;
    Ok(Json(response))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Identity),
        (status = 401, description = "NO_TOKEN, TokenExpiredError or INVALID_TOKEN", body = ErrorResponse),
        (status = 503, description = "User store unavailable (AUTH_UNAVAILABLE)", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}

/// Session status; never rejects
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Whether the caller is signed in", body = SessionResponse)
    ),
    security((), ("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn session(OptionalAuthUser(identity): OptionalAuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: identity.is_some(),
        user: identity,
    })
}
