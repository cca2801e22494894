//! Payment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::payment::{CreatePayment, Payment, PaymentStatus};

use super::audit::transition_with_audit;

/// Repository for payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a payment by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find payment", e))
    }

    /// Create a pending payment.
    pub async fn create(&self, data: &CreatePayment) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, user_id, entity_id, amount_cents, currency, status, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, 'pending', NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.entity_id)
        .bind(data.amount_cents)
        .bind(&data.currency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create payment", e))
    }

    /// Payments of a user, newest first.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list payments", e))
    }

    /// Gated status change with audit, optionally recording the provider
    /// reference. Returns `None` if the payment is not in `from`.
    pub async fn transition(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
        provider_reference: Option<&str>,
        audit: &CreateAuditLogEntry,
    ) -> AppResult<Option<Payment>> {
        let update = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $3, \
                 provider_reference = COALESCE($4, provider_reference), updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(provider_reference);

        transition_with_audit(&self.pool, update, audit).await
    }
}
