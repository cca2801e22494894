//! Admin dashboard counters.

use axum::Json;
use axum::extract::State;

use ecodeli_service::stats::PlatformStats;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/stats
pub async fn platform_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<PlatformStats>>, ApiError> {
    require_admin(&auth)?;
    let stats = state.stats_service.platform_stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
