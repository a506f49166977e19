//! Password credentials, as consumed by the login flow.

use async_trait::async_trait;

use crate::identity::{Identity, LookupError};

/// A user record together with its stored password hash.
#[derive(Clone)]
pub struct UserCredentials {
    pub identity: Identity,
    pub password_hash: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("identity", &self.identity)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks a user up by email regardless of account state; the caller
    /// decides what an inactive or banned account means.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, LookupError>;
}
