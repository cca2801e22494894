//! Database migration runner and demo-data reset.

use sqlx::PgPool;
use tracing::{info, warn};

use ecodeli_core::error::{AppError, ErrorKind};

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Delete every marketplace row, keeping the schema. Used before a forced
/// reseed.
pub async fn truncate_all(pool: &PgPool) -> Result<(), AppError> {
    warn!("Truncating all marketplace tables");
    sqlx::query(
        "TRUNCATE notifications, scheduled_notifications, notification_preferences, \
         audit_log, payments, bookings, deliveries, bids, announcements, users CASCADE",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to truncate tables", e))?;
    Ok(())
}

/// Whether the users table holds any row.
pub async fn has_users(pool: &PgPool) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users)")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))
}
