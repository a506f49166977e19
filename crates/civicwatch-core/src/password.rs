use std::sync::LazyLock;

use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

/// Stand-in hash checked when no account matches, at the same cost as real
/// hashes.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash("civicwatch-no-such-account", DEFAULT_COST).ok());

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

/// Verifies a login attempt against the stored hash, if any.
///
/// Without a stored hash the password is still run through bcrypt and the
/// result is always `false`, so unknown accounts take as long as wrong
/// passwords.
pub fn verify_login_password(password: &str, stored: Option<&str>) -> Result<bool, AppError> {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(password, dummy)?;
            }
            Ok(false)
        }
    }
}
