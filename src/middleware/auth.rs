use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use civicwatch_auth::{AuthFailure, Identity, RejectionKind, Viewer};
use civicwatch_core::AppError;
use civicwatch_observability::{track_anonymous_fallback, track_auth_rejection};

use crate::state::AppState;

/// The raw `Authorization` header. A value that is not valid UTF-8 is passed
/// on as empty so the gate reports it as malformed.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default())
}

/// Maps a gate failure to its HTTP rejection and counts it.
pub fn reject(failure: &AuthFailure) -> AppError {
    track_auth_rejection(failure.code());

    match failure.kind() {
        RejectionKind::Unauthenticated => {
            AppError::unauthorized(failure.code(), failure.public_message())
        }
        RejectionKind::Forbidden => AppError::forbidden(failure.public_message()),
        RejectionKind::Unavailable => {
            AppError::service_unavailable(failure.code(), failure.public_message())
        }
    }
}

/// Extractor for the authenticated user.
///
/// Reuses an identity attached by [`require_auth`] or a role layer; otherwise
/// runs the Required policy itself.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(AuthUser(identity.clone()));
        }

        let identity = state
            .gate
            .authenticate(authorization_header(&parts.headers))
            .await
            .map_err(|failure| reject(&failure))?;

        parts.extensions.insert(identity.clone());
        Ok(AuthUser(identity))
    }
}

/// Extractor for routes that personalize output but stay public. Never
/// rejects: anything short of a valid credential is `None`.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(viewer) = parts.extensions.get::<Viewer>() {
            return Ok(OptionalAuthUser(viewer.identity().cloned()));
        }
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(OptionalAuthUser(Some(identity.clone())));
        }

        let viewer = resolve_viewer(state, &parts.headers).await;
        parts.extensions.insert(viewer.clone());
        Ok(OptionalAuthUser(viewer.identity().cloned()))
    }
}

async fn resolve_viewer(state: &AppState, headers: &HeaderMap) -> Viewer {
    state
        .gate
        .authenticate_optional_with(authorization_header(headers), |failure| {
            track_anonymous_fallback(failure.code())
        })
        .await
}

/// Required policy as a layer: rejects, or attaches the [`Identity`].
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/me", get(me))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
/// ```
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    match AuthUser::from_request_parts(&mut parts, &state).await {
        Ok(_) => next.run(Request::from_parts(parts, body)).await,
        Err(err) => err.into_response(),
    }
}

/// Optional policy as a layer: always proceeds, attaching a [`Viewer`].
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let viewer = resolve_viewer(&state, req.headers()).await;
    if let Viewer::Authenticated(identity) = &viewer {
        req.extensions_mut().insert(identity.clone());
    }
    req.extensions_mut().insert(viewer);

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use civicwatch_auth::{LookupError, UserRole};

    #[test]
    fn test_authorization_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(authorization_header(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(authorization_header(&headers), Some("Bearer abc"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        );
        assert_eq!(authorization_header(&headers), Some(""));
    }

    #[test]
    fn test_reject_statuses() {
        assert_eq!(
            reject(&AuthFailure::MissingCredential).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(reject(&AuthFailure::Expired).code, Some("TokenExpiredError"));
        assert_eq!(
            reject(&AuthFailure::Forbidden {
                role: UserRole::User
            })
            .status,
            StatusCode::FORBIDDEN
        );

        let unavailable = reject(&AuthFailure::Unavailable(LookupError::new("db down")));
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.code, Some("AUTH_UNAVAILABLE"));
        assert!(!unavailable.error.to_string().contains("db down"));
    }
}
