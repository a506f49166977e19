//! Per-client rate limiting.
//!
//! Clients are keyed by peer IP. Behind a reverse proxy, set
//! `RATE_LIMIT_TRUST_PROXY=true` so the first `X-Forwarded-For` entry is used
//! instead; without it that header is ignored, since any client can set it.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use civicwatch_config::RateLimitConfig;
use civicwatch_core::AppError;
use civicwatch_observability::track_rate_limited;
use civicwatch_ratelimit::{Decision, RateLimiter};

use crate::state::AppState;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Try again later.";
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

const UNKNOWN_CLIENT: &str = "unknown";

pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// 429 with `Retry-After` set to the window length.
pub fn too_many_requests(config: RateLimitConfig) -> Response {
    let mut response = AppError::too_many_requests(RATE_LIMIT_MESSAGE).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(config.window_secs_ceil()));
    response
}

async fn enforce(
    state: &AppState,
    limiter: &RateLimiter,
    scope: &'static str,
    req: Request,
    next: Next,
) -> Response {
    if !state.rate_limit_settings.enabled {
        return next.run(req).await;
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer, state.rate_limit_settings.trust_proxy);
    let config = limiter.config();

    match limiter.admit(&key).await {
        Decision::Admit { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(LIMIT_HEADER, HeaderValue::from(config.limit));
            headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
            response
        }
        Decision::Reject => {
            warn!(client = %key, scope, limit = config.limit, window_ms = config.window_ms, "Rate limit exceeded");
            track_rate_limited(scope);
            too_many_requests(config)
        }
    }
}

/// Limits every API route with the general budget.
pub async fn rate_limit_general(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limiter = state.rate_limiters.general.clone();
    enforce(&state, &limiter, "general", req, next).await
}

/// Stricter budget for credential endpoints.
pub async fn rate_limit_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limiter = state.rate_limiters.auth.clone();
    enforce(&state, &limiter, "auth", req, next).await
}
