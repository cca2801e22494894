//! Delivery repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::delivery::{Delivery, DeliveryStatus};

use super::audit::transition_with_audit;

/// Repository for deliveries.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a delivery by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Delivery>> {
        sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find delivery", e))
    }

    /// Find the delivery created for an announcement.
    pub async fn find_by_announcement(&self, announcement_id: Uuid) -> AppResult<Option<Delivery>> {
        sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE announcement_id = $1")
            .bind(announcement_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find delivery", e))
    }

    /// Create the delivery of an assigned announcement.
    pub async fn create(
        &self,
        announcement_id: Uuid,
        deliverer_id: Uuid,
        client_id: Uuid,
        pickup_at: DateTime<Utc>,
        validation_code: &str,
    ) -> AppResult<Delivery> {
        sqlx::query_as::<_, Delivery>(
            "INSERT INTO deliveries (id, announcement_id, deliverer_id, client_id, status, \
             validation_code, pickup_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 'pending', $5, $6, NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(announcement_id)
        .bind(deliverer_id)
        .bind(client_id)
        .bind(validation_code)
        .bind(pickup_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("A delivery already exists for this announcement")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create delivery", e),
        })
    }

    /// Deliveries involving a user, as deliverer or client.
    pub async fn find_for_user(&self, user_id: Uuid) -> AppResult<Vec<Delivery>> {
        sqlx::query_as::<_, Delivery>(
            "SELECT * FROM deliveries WHERE deliverer_id = $1 OR client_id = $1 \
             ORDER BY pickup_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list deliveries", e))
    }

    /// Move a delivery from `from` to `to`, stamping pickup and drop-off
    /// times. Returns `None` if the delivery is not in `from`.
    pub async fn transition(
        &self,
        id: Uuid,
        from: DeliveryStatus,
        to: DeliveryStatus,
        now: DateTime<Utc>,
        audit: &CreateAuditLogEntry,
    ) -> AppResult<Option<Delivery>> {
        let update = sqlx::query_as::<_, Delivery>(
            "UPDATE deliveries SET status = $3, \
                 picked_up_at = CASE WHEN $3 = 'picked_up'::delivery_status THEN $4 ELSE picked_up_at END, \
                 delivered_at = CASE WHEN $3 = 'delivered'::delivery_status THEN $4 ELSE delivered_at END, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(now);

        transition_with_audit(&self.pool, update, audit).await
    }
}
