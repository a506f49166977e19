use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LimiterStatus {
    pub limit: u32,
    pub window_ms: u64,
    /// Clients with a live window in this limiter
    pub tracked_clients: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RateLimitStatusResponse {
    pub enabled: bool,
    pub trust_proxy: bool,
    pub general: LimiterStatus,
    pub auth: LimiterStatus,
}
