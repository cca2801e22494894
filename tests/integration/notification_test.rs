//! Scheduled reminders, admin scheduler controls and preferences against a
//! real database. Skipped unless `ECODELI_TEST_DATABASE_URL` is set.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use ecodeli_entity::user::{UserRole, ValidationStatus};

async fn published_announcement(app: &helpers::TestApp, token: &str) -> String {
    let now = Utc::now();
    let created = app
        .request(
            "POST",
            "/api/announcements",
            Some(serde_json::json!({
                "title": "Groceries",
                "description": "",
                "kind": "shopping",
                "pickup_address": "Marché d'Aligre, Paris",
                "delivery_address": "12 rue Oberkampf, Paris",
                "pickup_at": now + Duration::hours(6),
                "deadline": now + Duration::hours(72),
                "price_cents": 1500,
            })),
            Some(token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let id = created.data()["id"].as_str().expect("id").to_string();

    let published = app
        .request("POST", &format!("/api/announcements/{id}/publish"), None, Some(token))
        .await;
    assert_eq!(published.status, StatusCode::OK);
    id
}

#[tokio::test]
async fn test_publish_schedules_and_admin_cancels() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let client = app.create_user(UserRole::Client, ValidationStatus::Approved).await;
    let admin = app.create_user(UserRole::Admin, ValidationStatus::Approved).await;
    let client_token = app.token_for(&client);
    let admin_token = app.token_for(&admin);

    let id = published_announcement(&app, &client_token).await;

    let scheduled = app
        .request(
            "GET",
            "/api/notifications/scheduled?status=pending",
            None,
            Some(&client_token),
        )
        .await;
    assert_eq!(scheduled.status, StatusCode::OK);
    let items = scheduled.data()["items"].as_array().expect("items");
    assert!(!items.is_empty());
    assert!(items.iter().all(|n| n["entity_id"] == id.as_str()));
    assert!(items.iter().all(|n| n["kind"] == "announcement_unmatched"));

    let cancelled = app
        .request(
            "DELETE",
            &format!("/api/admin/notifications/entity/{id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["cancelled"], items.len() as u64);

    let after = app
        .request(
            "GET",
            "/api/notifications/scheduled?status=pending",
            None,
            Some(&client_token),
        )
        .await;
    assert_eq!(after.data()["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_admin_process_due_reports_counts() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let admin = app.create_user(UserRole::Admin, ValidationStatus::Approved).await;

    let response = app
        .request(
            "POST",
            "/api/admin/notifications/process-due",
            None,
            Some(&app.token_for(&admin)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    for field in ["claimed", "sent", "retried", "failed", "released", "lost", "errored"] {
        assert!(response.data()[field].is_u64(), "missing {field}");
    }
}

/// Runs the scheduler until `token`'s inbox holds a `kind` entry about
/// `entity_id`, and returns that entry.
async fn delivered_notice(
    app: &helpers::TestApp,
    admin_token: &str,
    token: &str,
    kind: &str,
    entity_id: &str,
) -> serde_json::Value {
    for _ in 0..20 {
        let inbox = app.request("GET", "/api/notifications", None, Some(token)).await;
        assert_eq!(inbox.status, StatusCode::OK);
        let found = inbox.data()["items"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|n| n["kind"] == kind && n["entity_id"] == entity_id)
            .cloned();
        if let Some(entry) = found {
            return entry;
        }
        let run = app
            .request("POST", "/api/admin/notifications/process-due", None, Some(admin_token))
            .await;
        assert_eq!(run.status, StatusCode::OK);
    }
    panic!("no {kind} notice for {entity_id}");
}

#[tokio::test]
async fn test_bid_events_reach_the_inbox_and_can_be_confirmed() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let client = app.create_user(UserRole::Client, ValidationStatus::Approved).await;
    let deliverer = app
        .create_user(UserRole::Deliverer, ValidationStatus::Approved)
        .await;
    let admin = app.create_user(UserRole::Admin, ValidationStatus::Approved).await;
    let client_token = app.token_for(&client);
    let deliverer_token = app.token_for(&deliverer);
    let admin_token = app.token_for(&admin);

    let id = published_announcement(&app, &client_token).await;
    let bid = app
        .request(
            "POST",
            &format!("/api/announcements/{id}/bids"),
            Some(serde_json::json!({ "price_cents": 1400 })),
            Some(&deliverer_token),
        )
        .await;
    assert_eq!(bid.status, StatusCode::CREATED, "{:?}", bid.body);
    let bid_id = bid.data()["id"].as_str().expect("bid id").to_string();

    let new_bid = delivered_notice(&app, &admin_token, &client_token, "new_bid", &id).await;
    assert_eq!(new_bid["requires_confirmation"], false);
    let new_bid_id = new_bid["id"].as_str().expect("id").to_string();

    // Only notices that ask for it can be confirmed.
    let refused = app
        .request(
            "POST",
            &format!("/api/notifications/{new_bid_id}/confirm"),
            None,
            Some(&client_token),
        )
        .await;
    assert_eq!(refused.status, StatusCode::NOT_FOUND);

    let accepted = app
        .request("POST", &format!("/api/bids/{bid_id}/accept"), None, Some(&client_token))
        .await;
    assert_eq!(accepted.status, StatusCode::OK);

    let notice =
        delivered_notice(&app, &admin_token, &deliverer_token, "bid_accepted", &id).await;
    assert_eq!(notice["requires_confirmation"], true);
    let notice_id = notice["id"].as_str().expect("id").to_string();

    // Another user cannot confirm it.
    let foreign = app
        .request(
            "POST",
            &format!("/api/notifications/{notice_id}/confirm"),
            None,
            Some(&client_token),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let confirmed = app
        .request(
            "POST",
            &format!("/api/notifications/{notice_id}/confirm"),
            None,
            Some(&deliverer_token),
        )
        .await;
    assert_eq!(confirmed.status, StatusCode::OK, "{:?}", confirmed.body);

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/notifications/{new_bid_id}"),
            None,
            Some(&client_token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let again = app
        .request(
            "DELETE",
            &format!("/api/notifications/{new_bid_id}"),
            None,
            Some(&client_token),
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sms_requires_phone() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let client = app.create_user(UserRole::Client, ValidationStatus::Approved).await;
    let token = app.token_for(&client);

    let rejected = app
        .request(
            "PUT",
            "/api/notifications/preferences",
            Some(serde_json::json!({ "sms_enabled": true })),
            Some(&token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let accepted = app
        .request(
            "PUT",
            "/api/notifications/preferences",
            Some(serde_json::json!({ "sms_enabled": true, "phone": "+33600000000" })),
            Some(&token),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.data()["sms_enabled"], true);
}

#[tokio::test]
async fn test_admin_validates_deliverer() {
    let Some(app) = helpers::TestApp::with_database().await else {
        return;
    };
    let admin = app.create_user(UserRole::Admin, ValidationStatus::Approved).await;
    let deliverer = app
        .create_user(UserRole::Deliverer, ValidationStatus::Pending)
        .await;
    let admin_token = app.token_for(&admin);

    let no_reason = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/validation", deliverer.id),
            Some(serde_json::json!({ "decision": "reject" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(no_reason.status, StatusCode::BAD_REQUEST);

    let approved = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/validation", deliverer.id),
            Some(serde_json::json!({ "decision": "approve" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.data()["validation_status"], "approved");

    let again = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/validation", deliverer.id),
            Some(serde_json::json!({ "decision": "approve" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let inbox = app
        .request(
            "GET",
            "/api/notifications/scheduled",
            None,
            Some(&app.token_for(&deliverer)),
        )
        .await;
    let kinds: Vec<&str> = inbox.data()["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"account_validated"));
}
