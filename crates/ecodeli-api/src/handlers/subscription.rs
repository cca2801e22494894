//! Subscription plan and pricing handlers.

use axum::Json;
use axum::extract::{Query, State};
use validator::Validate;

use ecodeli_core::error::AppError;
use ecodeli_entity::user::User;
use ecodeli_service::payment::{PlanInfo, Quote};

use crate::dto::request::{ChangePlanRequest, QuoteQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::extractors::json::field_errors;
use crate::state::AppState;

/// GET /api/subscriptions/plans
pub async fn list_plans(State(state): State<AppState>) -> Json<ApiResponse<Vec<PlanInfo>>> {
    Json(ApiResponse::ok(state.pricing_service.plans()))
}

/// GET /api/subscriptions/quote?base_price_cents=
pub async fn quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<ApiResponse<Quote>>, ApiError> {
    query.validate().map_err(|errors| {
        ApiError::from(AppError::validation("Invalid quote request"))
            .with_details(field_errors(&errors))
    })?;
    let quote = state
        .pricing_service
        .quote(&auth, query.base_price_cents)
        .await?;
    Ok(Json(ApiResponse::ok(quote)))
}

/// PUT /api/subscriptions/plan
pub async fn change_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePlanRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.pricing_service.change_plan(&auth, req.plan).await?;
    Ok(Json(ApiResponse::ok(user)))
}
