//! Identity resolution: from a verified subject claim to a live user record.
//!
//! The resolver reads a fresh snapshot from the user store on every call and
//! never caches across requests. Banned accounts are treated exactly like
//! inactive ones.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account roles, lowest privilege first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Citizen reporting issues
    User,
    /// Staff member handling reports
    Agent,
    /// Platform administrator
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Agent => "agent",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "agent" => Ok(UserRole::Agent),
            "admin" => Ok(UserRole::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Snapshot of a user record as seen by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_banned: bool,
}

impl Identity {
    /// Whether this account may authenticate at all.
    pub fn is_eligible(&self) -> bool {
        self.is_active && !self.is_banned
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}

/// Who is making a request on an optional-auth route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(Identity),
}

impl Viewer {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }
}

/// Failure of the backing user store (connection loss, query error).
///
/// Distinct from "not found": a lookup that succeeds and finds nothing returns
/// `Ok(None)`.
#[derive(Debug, Error)]
#[error("user lookup failed: {source}")]
pub struct LookupError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl LookupError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self { source: err.into() }
    }
}

/// The user store as seen by the auth layer.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Returns the user with `id` if it exists and is active.
    async fn find_active_user(&self, id: Uuid) -> Result<Option<Identity>, LookupError>;
}

/// Maps a token subject to a live, eligible identity.
#[derive(Clone)]
pub struct IdentityResolver {
    lookup: Arc<dyn UserLookup>,
}

impl IdentityResolver {
    pub fn new(lookup: Arc<dyn UserLookup>) -> Self {
        Self { lookup }
    }

    /// Performs exactly one read against the user store.
    ///
    /// Returns `Ok(None)` when the subject is not a user id, the user does not
    /// exist, or the account is inactive or banned.
    pub async fn resolve(&self, subject: &str) -> Result<Option<Identity>, LookupError> {
        let Ok(id) = Uuid::parse_str(subject) else {
            debug!("Token subject is not a user id");
            return Ok(None);
        };

        let identity = self.lookup.find_active_user(id).await?;

        Ok(identity.filter(Identity::is_eligible))
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory user store that counts reads. Mirrors the SQL filter on
    /// `is_active`, but returns banned rows so the resolver has to reject them.
    #[derive(Default)]
    pub(crate) struct MemoryUsers {
        pub users: Mutex<HashMap<Uuid, Identity>>,
        pub reads: AtomicUsize,
        pub fail: bool,
    }

    impl MemoryUsers {
        pub(crate) fn with(identities: Vec<Identity>) -> Self {
            Self {
                users: Mutex::new(identities.into_iter().map(|i| (i.id, i)).collect()),
                ..Default::default()
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl UserLookup for MemoryUsers {
        async fn find_active_user(&self, id: Uuid) -> Result<Option<Identity>, LookupError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LookupError::new("connection refused"));
            }
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).filter(|u| u.is_active).cloned())
        }
    }

    pub(crate) fn identity(role: UserRole) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: format!("{}@civicwatch.test", role),
            role,
            is_active: true,
            is_banned: false,
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::User, UserRole::Agent, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&UserRole::Agent).unwrap(), r#""agent""#);
    }

    #[tokio::test]
    async fn test_resolve_active_user() {
        let user = identity(UserRole::User);
        let store = Arc::new(MemoryUsers::with(vec![user.clone()]));
        let resolver = IdentityResolver::new(store.clone());

        let resolved = resolver.resolve(&user.id.to_string()).await.unwrap();
        assert_eq!(resolved, Some(user));
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_user() {
        let resolver = IdentityResolver::new(Arc::new(MemoryUsers::default()));
        let resolved = resolver.resolve(&Uuid::new_v4().to_string()).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_inactive_user() {
        let mut user = identity(UserRole::User);
        user.is_active = false;
        let resolver = IdentityResolver::new(Arc::new(MemoryUsers::with(vec![user.clone()])));

        assert!(resolver.resolve(&user.id.to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_banned_user() {
        let mut user = identity(UserRole::Admin);
        user.is_banned = true;
        let resolver = IdentityResolver::new(Arc::new(MemoryUsers::with(vec![user.clone()])));

        assert!(resolver.resolve(&user.id.to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_non_uuid_subject_skips_store() {
        let store = Arc::new(MemoryUsers::default());
        let resolver = IdentityResolver::new(store.clone());

        assert!(resolver.resolve("not-a-uuid").await.unwrap().is_none());
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_store_failure() {
        let resolver = IdentityResolver::new(Arc::new(MemoryUsers::failing()));
        let result = resolver.resolve(&Uuid::new_v4().to_string()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_reads_fresh_snapshot() {
        let user = identity(UserRole::User);
        let store = Arc::new(MemoryUsers::with(vec![user.clone()]));
        let resolver = IdentityResolver::new(store.clone());
        assert!(resolver.resolve(&user.id.to_string()).await.unwrap().is_some());

        store.users.lock().unwrap().get_mut(&user.id).unwrap().is_banned = true;

        assert!(resolver.resolve(&user.id.to_string()).await.unwrap().is_none());
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_viewer() {
        let user = identity(UserRole::User);
        assert!(!Viewer::Anonymous.is_authenticated());
        assert!(Viewer::Anonymous.identity().is_none());
        let viewer = Viewer::Authenticated(user.clone());
        assert!(viewer.is_authenticated());
        assert_eq!(viewer.identity(), Some(&user));
    }
}
