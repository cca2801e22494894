//! End-to-end announcement lifecycle against a real database.
//!
//! Skipped unless `ECODELI_TEST_DATABASE_URL` points at a PostgreSQL
//! instance.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use ecodeli_entity::user::{UserRole, ValidationStatus};

#[tokio::test]
async fn test_announcement_lifecycle() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let client = app.create_user(UserRole::Client, ValidationStatus::Approved).await;
    let deliverer = app
        .create_user(UserRole::Deliverer, ValidationStatus::Approved)
        .await;
    let client_token = app.token_for(&client);
    let deliverer_token = app.token_for(&deliverer);
    let now = Utc::now();

    let created = app
        .request(
            "POST",
            "/api/announcements",
            Some(serde_json::json!({
                "title": "Books to Marseille",
                "description": "Two boxes",
                "kind": "package_delivery",
                "pickup_address": "10 avenue Foch, Paris",
                "delivery_address": "5 quai du Port, Marseille",
                "pickup_at": now + Duration::hours(12),
                "deadline": now + Duration::hours(48),
                "price_cents": 4000,
            })),
            Some(&client_token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.data()["status"], "draft");
    let id = created.data()["id"].as_str().expect("id").to_string();

    // Bids are refused until the announcement is published.
    let early_bid = app
        .request(
            "POST",
            &format!("/api/announcements/{id}/bids"),
            Some(serde_json::json!({ "price_cents": 3500 })),
            Some(&deliverer_token),
        )
        .await;
    assert_eq!(early_bid.status, StatusCode::CONFLICT);

    let published = app
        .request("POST", &format!("/api/announcements/{id}/publish"), None, Some(&client_token))
        .await;
    assert_eq!(published.status, StatusCode::OK);
    assert_eq!(published.data()["status"], "active");

    let republish = app
        .request("POST", &format!("/api/announcements/{id}/publish"), None, Some(&client_token))
        .await;
    assert_eq!(republish.status, StatusCode::CONFLICT);

    let bid = app
        .request(
            "POST",
            &format!("/api/announcements/{id}/bids"),
            Some(serde_json::json!({ "price_cents": 3500, "message": "Driving there tomorrow" })),
            Some(&deliverer_token),
        )
        .await;
    assert_eq!(bid.status, StatusCode::CREATED, "{:?}", bid.body);
    let bid_id = bid.data()["id"].as_str().expect("bid id").to_string();

    let stranger = app
        .create_user(UserRole::Client, ValidationStatus::Approved)
        .await;
    let stolen = app
        .request(
            "POST",
            &format!("/api/bids/{bid_id}/accept"),
            None,
            Some(&app.token_for(&stranger)),
        )
        .await;
    assert_eq!(stolen.status, StatusCode::FORBIDDEN);

    let accepted = app
        .request("POST", &format!("/api/bids/{bid_id}/accept"), None, Some(&client_token))
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.data()["status"], "matched");

    let assigned = app
        .request("POST", &format!("/api/announcements/{id}/assign"), None, Some(&deliverer_token))
        .await;
    assert_eq!(assigned.status, StatusCode::OK, "{:?}", assigned.body);
    assert_eq!(assigned.data()["validation_code"], "");

    let started = app
        .request("POST", &format!("/api/announcements/{id}/start"), None, Some(&deliverer_token))
        .await;
    assert_eq!(started.data()["status"], "in_progress");

    let delivered = app
        .request("POST", &format!("/api/announcements/{id}/deliver"), None, Some(&deliverer_token))
        .await;
    assert_eq!(delivered.data()["status"], "delivered");

    let deliveries = app
        .request("GET", "/api/deliveries", None, Some(&client_token))
        .await;
    let code = deliveries.data()[0]["validation_code"]
        .as_str()
        .expect("client sees the code")
        .to_string();
    assert_eq!(code.len(), 6);

    let wrong = app
        .request(
            "POST",
            &format!("/api/announcements/{id}/validate"),
            Some(serde_json::json!({ "code": if code == "000000" { "111111" } else { "000000" } })),
            Some(&client_token),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let validated = app
        .request(
            "POST",
            &format!("/api/announcements/{id}/validate"),
            Some(serde_json::json!({ "code": code })),
            Some(&client_token),
        )
        .await;
    assert_eq!(validated.data()["status"], "validated");

    let completed = app
        .request("POST", &format!("/api/announcements/{id}/complete"), None, Some(&client_token))
        .await;
    assert_eq!(completed.data()["status"], "completed");

    let cancel = app
        .request(
            "POST",
            &format!("/api/announcements/{id}/cancel"),
            Some(serde_json::json!({})),
            Some(&client_token),
        )
        .await;
    assert_eq!(cancel.status, StatusCode::CONFLICT);

    let admin_token = app.token_for_role(UserRole::Admin);
    let trail = app
        .request(
            "GET",
            &format!("/api/admin/audit/announcement/{id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(trail.status, StatusCode::OK);
    assert_eq!(trail.data()["items"][0]["to_status"], "completed");
    assert!(trail.data()["total_items"].as_u64().unwrap_or(0) >= 5);
}

#[tokio::test]
async fn test_unvalidated_deliverer_cannot_bid() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let deliverer = app
        .create_user(UserRole::Deliverer, ValidationStatus::Pending)
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/announcements/{}/bids", uuid::Uuid::new_v4()),
            Some(serde_json::json!({ "price_cents": 1000 })),
            Some(&app.token_for(&deliverer)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_announcement() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let client = app.create_user(UserRole::Client, ValidationStatus::Approved).await;

    let response = app
        .request(
            "GET",
            &format!("/api/announcements/{}", uuid::Uuid::new_v4()),
            None,
            Some(&app.token_for(&client)),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), Some("NOT_FOUND"));
}
