//! Admin audit trail.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use ecodeli_core::types::pagination::PageResponse;
use ecodeli_entity::audit::AuditLogEntry;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/audit/{target_type}/{id}
pub async fn audit_trail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((target_type, id)): Path<(String, Uuid)>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AuditLogEntry>>>, ApiError> {
    require_admin(&auth)?;
    let page = state
        .stats_service
        .audit_trail(&auth, &target_type, id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
