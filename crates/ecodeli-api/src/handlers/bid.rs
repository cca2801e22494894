//! Bid decision handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ecodeli_entity::announcement::Announcement;
use ecodeli_entity::bid::Bid;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/bids/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, ApiError> {
    let announcement = state.announcement_service.accept_bid(&auth, id).await?;
    Ok(Json(ApiResponse::ok(announcement)))
}

/// POST /api/bids/{id}/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Bid>>, ApiError> {
    let bid = state.announcement_service.withdraw_bid(&auth, id).await?;
    Ok(Json(ApiResponse::ok(bid)))
}
