//! Integration tests for role gating. Every rejection here happens before
//! the database is touched.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use ecodeli_entity::user::UserRole;

fn announcement_body(deadline_in_hours: i64) -> serde_json::Value {
    let now = Utc::now();
    serde_json::json!({
        "title": "Parcel to Lyon",
        "description": "Small box, fragile",
        "kind": "package_delivery",
        "pickup_address": "1 rue de Rivoli, Paris",
        "delivery_address": "2 place Bellecour, Lyon",
        "pickup_at": now + Duration::hours(deadline_in_hours / 2),
        "deadline": now + Duration::hours(deadline_in_hours),
        "price_cents": 2500,
    })
}

#[tokio::test]
async fn test_client_cannot_process_due() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request(
            "POST",
            "/api/admin/notifications/process-due",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("FORBIDDEN"));
}

#[tokio::test]
async fn test_process_due_requires_token() {
    let app = helpers::TestApp::offline();

    let response = app
        .request("POST", "/api/admin/notifications/process-due", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deliverer_cannot_cancel_entity_reminders() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Deliverer);

    let response = app
        .request(
            "DELETE",
            &format!("/api/admin/notifications/entity/{}", uuid::Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_admin_cannot_see_stats_or_users() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Merchant);

    let stats = app.request("GET", "/api/admin/stats", None, Some(&token)).await;
    assert_eq!(stats.status, StatusCode::FORBIDDEN);

    let users = app.request("GET", "/api/admin/users", None, Some(&token)).await;
    assert_eq!(users.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deliverer_cannot_post_announcement() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Deliverer);

    let response = app
        .request(
            "POST",
            "/api/announcements",
            Some(announcement_body(48)),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_announcement_deadline_in_past() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request(
            "POST",
            "/api/announcements",
            Some(announcement_body(-2)),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_client_cannot_bid() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request(
            "POST",
            &format!("/api/announcements/{}/bids", uuid::Uuid::new_v4()),
            Some(serde_json::json!({ "price_cents": 2000 })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_client_cannot_refund() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request(
            "POST",
            &format!("/api/payments/{}/refund", uuid::Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validation_code_must_have_six_digits() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request(
            "POST",
            &format!("/api/announcements/{}/validate", uuid::Uuid::new_v4()),
            Some(serde_json::json!({ "code": "12" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["details"].get("code").is_some());
}

#[tokio::test]
async fn test_bad_uuid_in_path() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Client);

    let response = app
        .request("GET", "/api/bookings/not-a-uuid", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_audit_trail_is_admin_only() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Merchant);

    let response = app
        .request(
            "GET",
            &format!("/api/admin/audit/announcement/{}", uuid::Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("FORBIDDEN"));
}

#[tokio::test]
async fn test_audit_trail_rejects_unknown_target() {
    let app = helpers::TestApp::offline();
    let token = app.token_for_role(UserRole::Admin);

    let response = app
        .request(
            "GET",
            &format!("/api/admin/audit/parcel/{}", uuid::Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
}
