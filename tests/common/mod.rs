#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use uuid::Uuid;

use civicwatch::router::init_router;
use civicwatch::state::AppState;
use civicwatch_auth::{
    CredentialStore, Identity, LookupError, TokenCodec, UserCredentials, UserLookup, UserRole,
};
use civicwatch_config::{CorsConfig, JwtConfig, RateLimitConfig, RateLimitSettings};

pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const TEST_EXPIRY: i64 = 3600;

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        access_token_expiry: TEST_EXPIRY,
    }
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(&jwt_config())
}

/// In-memory users table standing in for PostgreSQL.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, UserCredentials>>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    pub fn add_user(&self, role: UserRole) -> Identity {
        let id = Uuid::new_v4();
        let identity = Identity {
            id,
            email: format!("{}-{}@civicwatch.test", role, id.simple()),
            role,
            is_active: true,
            is_banned: false,
        };
        let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();

        self.users.lock().unwrap().insert(
            id,
            UserCredentials {
                identity: identity.clone(),
                password_hash,
            },
        );
        identity
    }

    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut Identity)) {
        let mut users = self.users.lock().unwrap();
        f(&mut users.get_mut(&id).unwrap().identity);
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), LookupError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LookupError::new("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserLookup for MemoryUserStore {
    async fn find_active_user(&self, id: Uuid) -> Result<Option<Identity>, LookupError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let users = self.users.lock().unwrap();
        Ok(users
            .get(&id)
            .map(|c| c.identity.clone())
            .filter(|i| i.is_active))
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, LookupError> {
        self.check_available()?;

        let users = self.users.lock().unwrap();
        Ok(users.values().find(|c| c.identity.email == email).cloned())
    }
}

/// Generous limits, keyed by `X-Forwarded-For` so tests can pick a client.
pub fn rate_limit_settings() -> RateLimitSettings {
    RateLimitSettings {
        enabled: true,
        trust_proxy: true,
        general: RateLimitConfig::new(1000, 60_000),
        auth: RateLimitConfig::new(1000, 60_000),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryUserStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_rate_limits(rate_limit_settings())
    }

    pub fn with_rate_limits(settings: RateLimitSettings) -> Self {
        let store = Arc::new(MemoryUserStore::default());
        let state = AppState::new(
            &jwt_config(),
            store.clone(),
            store.clone(),
            settings,
            CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
        );
        Self { state, store }
    }

    pub fn router(&self) -> Router {
        init_router(self.state.clone())
    }
}

pub fn bearer(identity: &Identity) -> String {
    format!("Bearer {}", codec().issue(identity.id).unwrap().token)
}

/// A correctly signed token whose expiry passed a minute ago.
pub fn expired_bearer(identity: &Identity) -> String {
    let issued_at = unix_now() - TEST_EXPIRY - 60;
    format!(
        "Bearer {}",
        codec().issue_at(identity.id, issued_at).unwrap().token
    )
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-forwarded-for", "192.0.2.10");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get_from(uri: &str, client_ip: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-forwarded-for", client_ip)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value, client_ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client_ip)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Attaches a peer address the way `into_make_service_with_connect_info` does.
pub fn with_peer(mut request: Request<Body>, addr: &str) -> Request<Body> {
    let addr: SocketAddr = addr.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
