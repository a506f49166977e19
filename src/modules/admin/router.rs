use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::rate_limit_status;

pub fn init_admin_router() -> Router<AppState> {
    Router::new().route("/rate-limits", get(rate_limit_status))
}
