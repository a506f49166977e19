//! Authentication gate: the per-request state machine.
//!
//! ```text
//! Unauthenticated -> TokenPresent -> TokenValid -> IdentityResolved -> Authorized
//!        |                |              |                |
//!    NO_TOKEN     TokenExpiredError  INVALID_TOKEN     FORBIDDEN
//! ```
//!
//! Three policies sit on top of it:
//!
//! - **Required** ([`AuthGate::authenticate`]): every failure rejects.
//! - **Optional** ([`AuthGate::authenticate_optional`]): every failure degrades
//!   to [`Viewer::Anonymous`].
//! - **Role-gated** ([`AuthGate::authorize`]): Required plus an allow-list.
//!
//! A token that verifies but whose subject no longer resolves (deleted,
//! deactivated, banned) is reported with the same code and message as a
//! forged token, so the gate cannot be used to probe account state.

use thiserror::Error;
use tracing::{debug, warn};

use civicwatch_core::codes;

use crate::identity::{Identity, IdentityResolver, LookupError, UserRole, Viewer};
use crate::jwt::{TokenCodec, TokenError};

/// What the `Authorization` header supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    Absent,
    /// Present but not of the form `Bearer <token>`.
    Malformed,
    Bearer(&'a str),
}

impl<'a> Credential<'a> {
    pub fn from_header(value: Option<&'a str>) -> Self {
        let Some(value) = value else {
            return Credential::Absent;
        };

        match value.strip_prefix("Bearer ").map(str::trim) {
            Some(token) if !token.is_empty() => Credential::Bearer(token),
            _ => Credential::Malformed,
        }
    }
}

/// How a failure is surfaced over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// 401
    Unauthenticated,
    /// 403
    Forbidden,
    /// 503, retryable
    Unavailable,
}

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("no credential supplied")]
    MissingCredential,

    #[error("authorization header is not a bearer credential")]
    MalformedCredential,

    #[error("token expired")]
    Expired,

    #[error("token failed verification")]
    InvalidToken,

    #[error("token subject does not resolve to an eligible account")]
    UnknownSubject,

    #[error("role {role} is not permitted")]
    Forbidden { role: UserRole },

    #[error(transparent)]
    Unavailable(#[from] LookupError),
}

impl AuthFailure {
    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredential | AuthFailure::MalformedCredential => codes::NO_TOKEN,
            AuthFailure::Expired => codes::TOKEN_EXPIRED,
            AuthFailure::InvalidToken | AuthFailure::UnknownSubject => codes::INVALID_TOKEN,
            AuthFailure::Forbidden { .. } => codes::FORBIDDEN,
            AuthFailure::Unavailable(_) => codes::AUTH_UNAVAILABLE,
        }
    }

    /// Message shown to clients. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredential | AuthFailure::MalformedCredential => {
                "No token provided"
            }
            AuthFailure::Expired => "Token expired",
            AuthFailure::InvalidToken | AuthFailure::UnknownSubject => "Invalid token",
            AuthFailure::Forbidden { .. } => "Access denied",
            AuthFailure::Unavailable(_) => "Authentication service unavailable",
        }
    }

    pub fn kind(&self) -> RejectionKind {
        match self {
            AuthFailure::Forbidden { .. } => RejectionKind::Forbidden,
            AuthFailure::Unavailable(_) => RejectionKind::Unavailable,
            _ => RejectionKind::Unauthenticated,
        }
    }
}

/// Token codec plus identity resolver: everything needed to turn an
/// `Authorization` header into an [`Identity`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: TokenCodec,
    resolver: IdentityResolver,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, resolver: IdentityResolver) -> Self {
        Self { codec, resolver }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Required policy.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Identity, AuthFailure> {
        let token = match Credential::from_header(header) {
            Credential::Absent => return Err(AuthFailure::MissingCredential),
            Credential::Malformed => return Err(AuthFailure::MalformedCredential),
            Credential::Bearer(token) => token,
        };

        let claims = self.codec.verify(token).map_err(|e| match e {
            TokenError::Expired => AuthFailure::Expired,
            other => {
                debug!(error = %other, "Token verification failed");
                AuthFailure::InvalidToken
            }
        })?;

        match self.resolver.resolve(&claims.sub).await? {
            Some(identity) => Ok(identity),
            None => {
                debug!(subject = %claims.sub, "Verified token has no eligible account");
                Err(AuthFailure::UnknownSubject)
            }
        }
    }

    /// Optional policy. Never fails.
    pub async fn authenticate_optional(&self, header: Option<&str>) -> Viewer {
        self.authenticate_optional_with(header, |_| {}).await
    }

    /// Optional policy, reporting each degradation to `on_fallback`.
    ///
    /// A request with no credential at all is plain anonymous and is not
    /// reported.
    pub async fn authenticate_optional_with<F>(&self, header: Option<&str>, on_fallback: F) -> Viewer
    where
        F: FnOnce(&AuthFailure),
    {
        match self.authenticate(header).await {
            Ok(identity) => Viewer::Authenticated(identity),
            Err(AuthFailure::MissingCredential) => Viewer::Anonymous,
            Err(failure) => {
                if let AuthFailure::Unavailable(ref err) = failure {
                    warn!(error = %err, "User store unavailable, treating request as anonymous");
                } else {
                    debug!(code = failure.code(), "Credential rejected, treating request as anonymous");
                }
                on_fallback(&failure);
                Viewer::Anonymous
            }
        }
    }

    /// Role-gated policy: Required, then an allow-list check.
    pub async fn authorize(
        &self,
        header: Option<&str>,
        allowed: &[UserRole],
    ) -> Result<Identity, AuthFailure> {
        let identity = self.authenticate(header).await?;
        check_any_role(&identity, allowed)?;
        Ok(identity)
    }
}

pub fn check_role(identity: &Identity, required: UserRole) -> Result<(), AuthFailure> {
    check_any_role(identity, &[required])
}

pub fn check_any_role(identity: &Identity, allowed: &[UserRole]) -> Result<(), AuthFailure> {
    if identity.has_any_role(allowed) {
        Ok(())
    } else {
        debug!(user_id = %identity.id, role = %identity.role, ?allowed, "Role not permitted");
        Err(AuthFailure::Forbidden {
            role: identity.role,
        })
    }
}
