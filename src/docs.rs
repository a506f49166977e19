use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use civicwatch_auth::{Identity, UserRole};

use crate::modules::admin::model::{LimiterStatus, RateLimitStatusResponse};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, SessionResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::session,
        crate::modules::admin::controller::rate_limit_status,
    ),
    components(
        schemas(
            Identity,
            UserRole,
            LoginRequest,
            LoginResponse,
            SessionResponse,
            LimiterStatus,
            RateLimitStatusResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and session endpoints"),
        (name = "Admin", description = "Operational endpoints for administrators")
    ),
    info(
        title = "CivicWatch API",
        version = "0.1.0",
        description = "Civic issue reporting API. Protected routes take `Authorization: Bearer <token>`; every `/api` route is rate limited per client.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in ["/api/auth/login", "/api/auth/me", "/api/auth/session", "/api/admin/rate-limits"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
