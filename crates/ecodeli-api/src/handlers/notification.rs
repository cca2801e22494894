//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use ecodeli_core::types::pagination::PageResponse;
use ecodeli_entity::notification::{
    InboxNotification, NotificationPreference, ScheduledNotification,
};
use ecodeli_service::notification::PreferenceUpdate;

use crate::dto::request::{InboxQuery, ScheduledQuery};
use crate::dto::response::{ApiResponse, CountResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<InboxQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<InboxNotification>>>, ApiError> {
    let page = state
        .notification_service
        .list_inbox(&auth, filter.unread_only, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Marked as read"))))
}

/// POST /api/notifications/{id}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.notification_service.confirm(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Confirmed"))))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.notification_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Notification deleted"))))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "marked": count } }),
    ))
}

/// GET /api/notifications/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<NotificationPreference>>, ApiError> {
    let prefs = state.notification_service.get_preferences(&auth).await?;
    Ok(Json(ApiResponse::ok(prefs)))
}

/// PUT /api/notifications/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<PreferenceUpdate>,
) -> Result<Json<ApiResponse<NotificationPreference>>, ApiError> {
    let prefs = state
        .notification_service
        .update_preferences(&auth, update)
        .await?;
    Ok(Json(ApiResponse::ok(prefs)))
}

/// GET /api/notifications/scheduled
pub async fn list_scheduled(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<ScheduledQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ScheduledNotification>>>, ApiError> {
    let page = state
        .notification_service
        .list_scheduled(&auth, filter.status, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
