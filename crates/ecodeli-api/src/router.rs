//! Route definitions for the EcoDeli HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the body-limit and logging
/// layers. CORS, compression and tracing are added by `build_app`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_kb * 1024;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(announcement_routes())
        .merge(bid_routes())
        .merge(delivery_routes())
        .merge(booking_routes())
        .merge(payment_routes())
        .merge(subscription_routes())
        .merge(notification_routes())
        .merge(admin_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Auth endpoints: register, login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

fn announcement_routes() -> Router<AppState> {
    use handlers::announcement as h;

    Router::new()
        .route(
            "/announcements",
            get(h::list_announcements).post(h::create_announcement),
        )
        .route("/announcements/{id}", get(h::get_announcement))
        .route("/announcements/{id}/publish", post(h::publish))
        .route("/announcements/{id}/bids", get(h::list_bids).post(h::place_bid))
        .route("/announcements/{id}/assign", post(h::assign))
        .route("/announcements/{id}/start", post(h::start))
        .route("/announcements/{id}/deliver", post(h::deliver))
        .route("/announcements/{id}/validate", post(h::validate))
        .route("/announcements/{id}/complete", post(h::complete))
        .route("/announcements/{id}/cancel", post(h::cancel))
}

fn bid_routes() -> Router<AppState> {
    Router::new()
        .route("/bids/{id}/accept", post(handlers::bid::accept))
        .route("/bids/{id}/withdraw", post(handlers::bid::withdraw))
}

fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route("/deliveries", get(handlers::delivery::list_deliveries))
        .route("/deliveries/{id}", get(handlers::delivery::get_delivery))
        .route(
            "/deliveries/{id}/in-transit",
            post(handlers::delivery::mark_in_transit),
        )
}

fn booking_routes() -> Router<AppState> {
    use handlers::booking as h;

    Router::new()
        .route("/bookings", get(h::list_bookings).post(h::create_booking))
        .route("/bookings/{id}", get(h::get_booking))
        .route("/bookings/{id}/confirm", post(h::confirm))
        .route("/bookings/{id}/start", post(h::start))
        .route("/bookings/{id}/complete", post(h::complete))
        .route("/bookings/{id}/cancel", post(h::cancel))
}

fn payment_routes() -> Router<AppState> {
    use handlers::payment as h;

    Router::new()
        .route("/payments", get(h::list_payments).post(h::create_payment))
        .route("/payments/{id}", get(h::get_payment))
        .route("/payments/{id}/complete", post(h::complete))
        .route("/payments/{id}/fail", post(h::fail))
        .route("/payments/{id}/refund", post(h::refund))
}

fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions/plans",
            get(handlers::subscription::list_plans),
        )
        .route("/subscriptions/quote", get(handlers::subscription::quote))
        .route(
            "/subscriptions/plan",
            put(handlers::subscription::change_plan),
        )
}

/// Notification endpoints: inbox, preferences, scheduled rows
fn notification_routes() -> Router<AppState> {
    use handlers::notification as h;

    Router::new()
        .route("/notifications", get(h::list_notifications))
        .route("/notifications/unread-count", get(h::unread_count))
        .route("/notifications/read-all", put(h::mark_all_read))
        .route("/notifications/{id}", delete(h::delete_notification))
        .route("/notifications/{id}/read", put(h::mark_read))
        .route("/notifications/{id}/confirm", post(h::confirm))
        .route(
            "/notifications/preferences",
            get(h::get_preferences).put(h::update_preferences),
        )
        .route("/notifications/scheduled", get(h::list_scheduled))
}

/// Admin endpoints: account validation, stats, audit trail, scheduler controls
fn admin_routes() -> Router<AppState> {
    use handlers::admin;

    Router::new()
        .route("/admin/users", get(admin::users::list_users))
        .route("/admin/users/{id}", get(admin::users::get_user))
        .route(
            "/admin/users/{id}/validation",
            post(admin::users::validate_user),
        )
        .route("/admin/stats", get(admin::stats::platform_stats))
        .route(
            "/admin/audit/{target_type}/{id}",
            get(admin::audit::audit_trail),
        )
        .route(
            "/admin/notifications/process-due",
            post(admin::notifications::process_due),
        )
        .route(
            "/admin/notifications/entity/{id}",
            delete(admin::notifications::cancel_for_entity),
        )
}
