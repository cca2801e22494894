//! Announcement lifecycle handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use ecodeli_core::types::pagination::PageResponse;
use ecodeli_entity::announcement::Announcement;
use ecodeli_entity::bid::Bid;
use ecodeli_entity::delivery::Delivery;
use ecodeli_service::marketplace::CancelOutcome;

use crate::dto::request::{
    AnnouncementQuery, CancelRequest, CreateAnnouncementRequest, PlaceBidRequest,
    ValidateDeliveryRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/announcements
pub async fn list_announcements(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<AnnouncementQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Announcement>>>, ApiError> {
    let page = state
        .announcement_service
        .list(&auth, filter.status, filter.mine, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Announcement>>), ApiError> {
    let announcement = state
        .announcement_service
        .create(&auth, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(announcement))))
}

/// GET /api/announcements/{id}
pub async fn get_announcement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state.announcement_service.get(id).await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// POST /api/announcements/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state.announcement_service.publish(&auth, id).await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// GET /api/announcements/{id}/bids
pub async fn list_bids(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Bid>>>, ApiError> {
    let bids = state.announcement_service.list_bids(&auth, id).await?;
    Ok(Json(ApiResponse::ok(bids)))
}

/// POST /api/announcements/{id}/bids
pub async fn place_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<PlaceBidRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Bid>>), ApiError> {
    let bid = state
        .announcement_service
        .place_bid(&auth, id, req.price_cents, req.message)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(bid))))
}

/// POST /api/announcements/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Delivery>>, ApiError> {
    let delivery = state.announcement_service.assign(&auth, id).await?;
    Ok(Json(ApiResponse::ok(delivery)))
}

/// POST /api/announcements/{id}/start
pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state.announcement_service.start(&auth, id).await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// POST /api/announcements/{id}/deliver
pub async fn deliver(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state.announcement_service.deliver(&auth, id).await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// POST /api/announcements/{id}/validate
pub async fn validate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ValidateDeliveryRequest>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state
        .announcement_service
        .validate(&auth, id, &req.code)
        .await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// POST /api/announcements/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state.announcement_service.complete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// POST /api/announcements/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CancelRequest>,
) -> Result<Json<ApiResponse<CancelOutcome>>, ApiError> {
    let outcome = state
        .announcement_service
        .cancel(&auth, id, req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
