//! Aggregations for the admin dashboard.

use sqlx::PgPool;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::announcement::AnnouncementStatus;
use ecodeli_entity::user::{UserRole, ValidationStatus};

/// Read-only aggregate queries.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Create a new stats repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// User counts per role and validation status.
    pub async fn users_by_role(&self) -> AppResult<Vec<(UserRole, ValidationStatus, i64)>> {
        sqlx::query_as::<_, (UserRole, ValidationStatus, i64)>(
            "SELECT role, validation_status, COUNT(*) FROM users \
             GROUP BY role, validation_status ORDER BY role, validation_status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))
    }

    /// Announcement counts per status.
    pub async fn announcements_by_status(&self) -> AppResult<Vec<(AnnouncementStatus, i64)>> {
        sqlx::query_as::<_, (AnnouncementStatus, i64)>(
            "SELECT status, COUNT(*) FROM announcements GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count announcements", e)
        })
    }

    /// Sum of completed and refunded payment amounts, in cents.
    pub async fn payment_totals(&self) -> AppResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
                 COALESCE(SUM(amount_cents) FILTER (WHERE status = 'completed'), 0)::BIGINT, \
                 COALESCE(SUM(amount_cents) FILTER (WHERE status = 'refunded'), 0)::BIGINT \
             FROM payments",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sum payments", e))
    }
}
