//! Integration tests for authentication and request validation.

mod helpers;

use axum::http::StatusCode;
use ecodeli_entity::user::UserRole;

#[tokio::test]
async fn test_me_requires_token() {
    let app = helpers::TestApp::offline();

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("UNAUTHORIZED"));
    assert!(response.body.get("message").is_some());
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = helpers::TestApp::offline();

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = helpers::TestApp::offline();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": "nope",
                "password": "Password123!",
                "name": "Ana",
                "role": "client",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
    assert!(response.body["details"].get("email").is_some());
}

#[tokio::test]
async fn test_register_unknown_role() {
    let app = helpers::TestApp::offline();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": "ana@test.ecodeli",
                "password": "Password123!",
                "name": "Ana",
                "role": "superuser",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request(
            "POST",
            "/api/payments",
            Some(serde_json::json!({ "amount_cents": "lots" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let app = helpers::TestApp::offline();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["database"], "unavailable");
    assert_eq!(response.data()["status"], "degraded");
}

#[tokio::test]
async fn test_register_and_login() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let email = format!("{}@test.ecodeli", uuid::Uuid::new_v4());

    let registered = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "password": "Password123!",
                "name": "Driver",
                "role": "deliverer",
            })),
            None,
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.data()["validation_status"], "pending");
    assert!(registered.data().get("password_hash").is_none());

    let duplicate = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "password": "Password123!",
                "name": "Driver",
                "role": "deliverer",
            })),
            None,
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": email, "password": "Password123!" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.data()["access_token"].as_str().expect("access_token");

    let me = app.request("GET", "/api/auth/me", None, Some(token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["email"], email);

    let wrong = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": email, "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_cannot_self_register() {
    let app = helpers::TestApp::offline();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": "mallory@test.ecodeli",
                "password": "Password123!",
                "name": "Mallory",
                "role": "admin",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("FORBIDDEN"));
}
