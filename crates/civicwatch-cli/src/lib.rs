//! # CivicWatch CLI
//!
//! Administrative commands that run outside the HTTP API:
//!
//! - `create-user`: insert an account with a given role (the only way to
//!   create agents and admins)
//! - `issue-token`: mint an access token for an existing user id
//! - `migrate`: apply database migrations

use anyhow::{Context, bail};
use uuid::Uuid;
use validator::ValidateEmail;

use civicwatch_auth::{Identity, IssuedToken, TokenCodec, UserRole};
use civicwatch_config::JwtConfig;
use civicwatch_core::hash_password;
use civicwatch_db::PgUserStore;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks the inputs of `create-user` before touching the database.
pub fn validate_new_user(email: &str, password: &str) -> anyhow::Result<()> {
    if !email.validate_email() {
        bail!("'{}' is not a valid email address", email);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LENGTH);
    }
    Ok(())
}

pub fn parse_role(value: &str) -> Result<UserRole, String> {
    value
        .parse::<UserRole>()
        .map_err(|_| format!("expected one of: user, agent, admin (got '{}')", value))
}

pub async fn create_user(
    store: &PgUserStore,
    email: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Identity> {
    validate_new_user(email, password)?;

    let password_hash = hash_password(password).map_err(|e| e.error)?;

    store
        .create_user(email, &password_hash, role)
        .await
        .with_context(|| format!("Failed to create user {}", email))
}

pub fn issue_token(config: &JwtConfig, subject: &str) -> anyhow::Result<IssuedToken> {
    let subject = Uuid::parse_str(subject).context("Subject must be a user id (UUID)")?;

    Ok(TokenCodec::new(config).issue(subject)?)
}
