//! Booking repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::booking::{Booking, BookingStatus, CreateBooking};

use super::audit::transition_with_audit;

/// Repository for provider bookings.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))
    }

    /// Create a pending booking.
    pub async fn create(&self, data: &CreateBooking) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, client_id, provider_id, service_name, starts_at, \
             duration_minutes, price_cents, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.client_id)
        .bind(data.provider_id)
        .bind(&data.service_name)
        .bind(data.starts_at)
        .bind(data.duration_minutes)
        .bind(data.price_cents)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create booking", e))
    }

    /// Bookings involving a user, as client or provider.
    pub async fn find_for_user(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE client_id = $1 OR provider_id = $1 ORDER BY starts_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list bookings", e))
    }

    /// Gated status change with audit. Returns `None` if the booking is not
    /// in `from`.
    pub async fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        audit: &CreateAuditLogEntry,
    ) -> AppResult<Option<Booking>> {
        let update = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to);

        transition_with_audit(&self.pool, update, audit).await
    }
}
