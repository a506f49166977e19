//! Token codec: issues and verifies signed, expiring identity tokens.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}` where
//! `exp = iat + access_token_expiry`. The server keeps no session state; a
//! token is valid exactly as long as its signature checks out and `exp` has
//! not passed.
//!
//! # Example
//!
//! ```ignore
//! use civicwatch_auth::TokenCodec;
//! use civicwatch_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env()?);
//! let issued = codec.issue(user_id)?;
//! let claims = codec.verify(&issued.token)?;
//! assert_eq!(claims.sub, user_id.to_string());
//! ```

use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use civicwatch_config::JwtConfig;

use crate::claims::Claims;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature is valid but the current time is past `exp`.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed payload, missing claims or wrong algorithm.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// A freshly signed token together with its expiry, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: usize,
    /// Lifetime in seconds from issuance
    pub expires_in: i64,
}

/// Signs and verifies access tokens with a process-wide secret.
///
/// Keys are derived once at construction; cloning is cheap enough to keep a
/// copy in application state.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: i64,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means `now > exp`, with no grace period.
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry: config.access_token_expiry,
        }
    }

    /// Token lifetime in seconds.
    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    /// Issues a token for `subject`, stamped with the current time.
    pub fn issue(&self, subject: Uuid) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issues a token for `subject` as if it had been signed at `issued_at`
    /// (Unix seconds).
    pub fn issue_at(&self, subject: Uuid, issued_at: i64) -> Result<IssuedToken, TokenError> {
        let iat = issued_at.max(0) as usize;
        let exp = iat + self.expiry as usize;

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            token,
            expires_at: exp,
            expires_in: self.expiry,
        })
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    ///
    /// Verification has no side effects; calling it repeatedly on the same
    /// unexpired token yields the same claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
