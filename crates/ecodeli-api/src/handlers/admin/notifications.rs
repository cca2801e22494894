//! Admin controls over the notification scheduler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ecodeli_service::notification::ProcessReport;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// POST /api/admin/notifications/process-due
///
/// Runs one pass of the due-notification runner immediately, alongside
/// whatever the background worker is doing.
pub async fn process_due(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ProcessReport>>, ApiError> {
    require_admin(&auth)?;
    let report = state.notification_service.process_due(&auth).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// DELETE /api/admin/notifications/entity/{id}
pub async fn cancel_for_entity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entity_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&auth)?;
    let cancelled = state
        .notification_service
        .cancel_for_entity(&auth, entity_id)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "entity_id": entity_id, "cancelled": cancelled }
    })))
}
