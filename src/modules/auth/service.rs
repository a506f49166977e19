use tracing::{info, instrument, warn};

use civicwatch_auth::{CredentialStore, TokenCodec};
use civicwatch_core::{AppError, codes, verify_login_password};
use civicwatch_observability::{track_login, track_token_issued};

use super::model::{LoginRequest, LoginResponse};

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Exchanges email and password for a bearer token.
    ///
    /// An unknown email, a wrong password and an inactive or banned account
    /// all produce the same 401.
    #[instrument(skip(credentials, codec, dto), fields(email = %dto.email))]
    pub async fn login_user(
        credentials: &dyn CredentialStore,
        codec: &TokenCodec,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let invalid = || AppError::unauthorized(codes::INVALID_CREDENTIALS, INVALID_CREDENTIALS_MESSAGE);

        let found = credentials
            .find_credentials_by_email(&dto.email)
            .await
            .map_err(|err| {
                warn!(error = %err, "Credential lookup failed");
                AppError::service_unavailable(
                    codes::AUTH_UNAVAILABLE,
                    "Authentication service unavailable",
                )
            })?;

        let password_matches = verify_login_password(
            &dto.password,
            found.as_ref().map(|f| f.password_hash.as_str()),
        )?;

        let Some(found) = found else {
            track_login("unknown_email");
            return Err(invalid());
        };

        if !password_matches {
            track_login("wrong_password");
            return Err(invalid());
        }

        if !found.identity.is_eligible() {
            track_login("ineligible");
            return Err(invalid());
        }

        let issued = codec.issue(found.identity.id)?;
        track_token_issued();
        track_login("success");
        info!(user_id = %found.identity.id, role = %found.identity.role, "User logged in");

        Ok(LoginResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user: found.identity,
        })
    }
}
