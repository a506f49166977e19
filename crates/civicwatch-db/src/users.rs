//! PostgreSQL-backed user store.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use civicwatch_auth::{
    CredentialStore, Identity, LookupError, UserCredentials, UserLookup, UserRole,
};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    is_active: bool,
    is_banned: bool,
}

impl TryFrom<UserRow> for Identity {
    type Error = LookupError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<UserRole>().map_err(LookupError::new)?;
        Ok(Identity {
            id: row.id,
            email: row.email,
            role,
            is_active: row.is_active,
            is_banned: row.is_banned,
        })
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

/// Users table access for the auth layer and the CLI.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts an active user. `password_hash` must already be hashed.
    #[instrument(skip(self, password_hash))]
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<Identity, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password, role)
             VALUES ($1, $2, $3)
             RETURNING id, email, role, is_active, is_banned",
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Identity::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }
}

#[async_trait]
impl UserLookup for PgUserStore {
    #[instrument(skip(self))]
    async fn find_active_user(&self, id: Uuid) -> Result<Option<Identity>, LookupError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, role, is_active, is_banned
             FROM users
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LookupError::new)?;

        row.map(Identity::try_from).transpose()
    }
}

#[async_trait]
impl CredentialStore for PgUserStore {
    #[instrument(skip(self))]
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, LookupError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, role, is_active, is_banned, password
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(LookupError::new)?;

        row.map(|row| {
            Ok(UserCredentials {
                identity: Identity::try_from(row.user)?,
                password_hash: row.password,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "citizen@civicwatch.test".to_string(),
            role: role.to_string(),
            is_active: true,
            is_banned: false,
        }
    }

    #[test]
    fn test_row_into_identity() {
        let identity = Identity::try_from(row("agent")).unwrap();
        assert_eq!(identity.role, UserRole::Agent);
        assert!(identity.is_eligible());
    }

    #[test]
    fn test_unknown_role_is_lookup_error() {
        assert!(Identity::try_from(row("superuser")).is_err());
    }
}
