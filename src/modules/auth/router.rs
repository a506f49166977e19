use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::rate_limit::rate_limit_auth;
use crate::state::AppState;

use super::controller::{login_user, me, session};

pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(login_user).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth,
            )),
        )
        .route("/me", get(me))
        .route("/session", get(session))
}
