mod common;

use std::time::Instant;

use axum::http::StatusCode;
use civicwatch_auth::UserRole;
use common::{TEST_EXPIRY, TEST_PASSWORD, TestApp, body_json, get, post_json};
use serde_json::json;
use tower::ServiceExt;

const CLIENT: &str = "192.0.2.20";

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::Agent);

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": TEST_PASSWORD }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["expires_in"], TEST_EXPIRY);
    assert_eq!(body["user"]["role"], "agent");

    let token = body["token"].as_str().unwrap();
    let me = app
        .router()
        .oneshot(get("/api/auth/me", Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["id"], user.id.to_string());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::User);

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": "not-the-password" }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Invalid email or password", "code": "INVALID_CREDENTIALS" })
    );
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::User);

    let unknown = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "nobody@civicwatch.test", "password": TEST_PASSWORD }),
            CLIENT,
        ))
        .await
        .unwrap();
    let wrong = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": "nope-nope" }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(unknown.status(), wrong.status());
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

#[tokio::test]
async fn test_login_unknown_email_still_checks_a_password() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::User);

    // Stored test hashes use cost 4; unknown emails are checked at the
    // default cost, so they can never finish first.
    let started = Instant::now();
    let wrong = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": "nope-nope" }),
            CLIENT,
        ))
        .await
        .unwrap();
    let wrong_elapsed = started.elapsed();

    let started = Instant::now();
    let unknown = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "nobody@civicwatch.test", "password": "nope-nope" }),
            CLIENT,
        ))
        .await
        .unwrap();
    let unknown_elapsed = started.elapsed();

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert!(
        unknown_elapsed >= wrong_elapsed,
        "unknown email answered in {:?}, wrong password in {:?}",
        unknown_elapsed,
        wrong_elapsed
    );
}

#[tokio::test]
async fn test_login_banned_account() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::User);
    app.store.update(user.id, |u| u.is_banned = true);

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": TEST_PASSWORD }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::Admin);
    app.store.update(user.id, |u| u.is_active = false);

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": TEST_PASSWORD }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_invalid_email_format() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_login_missing_password() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "citizen@civicwatch.test" }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "password is required");
}

#[tokio::test]
async fn test_login_store_outage() {
    let app = TestApp::new();
    let user = app.store.add_user(UserRole::User);
    app.store.set_unavailable(true);

    let response = app
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": user.email, "password": TEST_PASSWORD }),
            CLIENT,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "AUTH_UNAVAILABLE");
}
