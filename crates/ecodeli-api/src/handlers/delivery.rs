//! Delivery handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ecodeli_entity::delivery::Delivery;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/deliveries
pub async fn list_deliveries(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Delivery>>>, ApiError> {
    let deliveries = state.delivery_service.list_for_user(&auth).await?;
    Ok(Json(ApiResponse::ok(deliveries)))
}

/// GET /api/deliveries/{id}
pub async fn get_delivery(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Delivery>>, ApiError> {
    let delivery = state.delivery_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(delivery)))
}

/// POST /api/deliveries/{id}/in-transit
pub async fn mark_in_transit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Delivery>>, ApiError> {
    let delivery = state.delivery_service.mark_in_transit(&auth, id).await?;
    Ok(Json(ApiResponse::ok(delivery)))
}
