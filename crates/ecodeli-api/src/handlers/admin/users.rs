//! Admin account management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use ecodeli_core::types::pagination::PageResponse;
use ecodeli_entity::user::User;

use crate::dto::request::{UserQuery, ValidateAccountRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<UserQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<User>>>, ApiError> {
    require_admin(&auth)?;
    let page = state
        .admin_account_service
        .list_users(&auth, filter.role, filter.validation, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    require_admin(&auth)?;
    let user = state.admin_account_service.get_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/admin/users/{id}/validation
pub async fn validate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ValidateAccountRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    require_admin(&auth)?;
    let user = state
        .admin_account_service
        .validate_user(&auth, id, req.decision, req.reason.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}
