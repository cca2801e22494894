//! Payment handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use ecodeli_entity::payment::Payment;

use crate::dto::request::{CompletePaymentRequest, CreatePaymentRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiError> {
    let payments = state.payment_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(payments)))
}

/// POST /api/payments
pub async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiError> {
    let payment = state.payment_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(payment))))
}

/// GET /api/payments/{id}
pub async fn get_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = state.payment_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// POST /api/payments/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CompletePaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = state
        .payment_service
        .complete(&auth, id, req.provider_reference.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// POST /api/payments/{id}/fail
pub async fn fail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = state.payment_service.fail(&auth, id).await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// POST /api/payments/{id}/refund
pub async fn refund(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = state.payment_service.refund(&auth, id).await?;
    Ok(Json(ApiResponse::ok(payment)))
}
