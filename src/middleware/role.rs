//! Role-based authorization for Axum
//!
//! Two ways to gate a route on role:
//! 1. Layer-based, with [`require_roles`] and the [`require_admin`] /
//!    [`require_staff`] wrappers
//! 2. Extractor-based, with [`RequireAdmin`] / [`RequireStaff`]
//!
//! Both authenticate first, so a request with no usable token gets 401, never
//! 403.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use civicwatch_auth::{UserRole, check_any_role};
use civicwatch_core::AppError;

use crate::middleware::auth::{AuthUser, reject};
use crate::state::AppState;

pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin];
pub const STAFF_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Agent];

/// Checks that the authenticated user holds one of `allowed_roles`.
///
/// # Usage with axum::middleware::from_fn_with_state
///
/// ```rust,ignore
/// let protected_routes = Router::new()
///     .route("/reports/{id}/assign", post(assign_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         |state, req, next| require_roles(state, req, next, &[UserRole::Agent])
///     ));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthUser(identity) = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&identity, allowed_roles).map_err(|failure| reject(&failure))?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Admin-only routes.
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/rate-limits", get(rate_limit_status))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, ADMIN_ROLES).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Staff routes: admins and agents.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, STAFF_ROLES).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Declares an extractor that yields the identity only if its role is in the
/// given allow-list.
macro_rules! require_role {
    ($name:ident, $roles:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub civicwatch_auth::Identity);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = civicwatch_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let $crate::middleware::auth::AuthUser(identity) =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                civicwatch_auth::check_any_role(&identity, $roles)
                    .map_err(|failure| $crate::middleware::auth::reject(&failure))?;

                Ok($name(identity))
            }
        }
    };
}

require_role!(RequireAdmin, ADMIN_ROLES);
require_role!(RequireStaff, STAFF_ROLES);
