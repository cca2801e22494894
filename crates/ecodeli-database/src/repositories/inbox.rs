//! In-app notification repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::notification::{InboxNotification, ScheduledNotification};

/// Repository for the in-app inbox.
#[derive(Debug, Clone)]
pub struct InboxRepository {
    pool: PgPool,
}

impl InboxRepository {
    /// Create a new inbox repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write the inbox entry of a delivered scheduled notification.
    ///
    /// The `scheduled_id` column is unique, so a row delivered twice only
    /// ever produces one inbox entry.
    pub async fn create_from_scheduled(
        &self,
        scheduled: &ScheduledNotification,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, scheduled_id, kind, title, message, entity_id, \
             is_read, requires_confirmation, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, NOW()) \
             ON CONFLICT (scheduled_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(scheduled.recipient_id)
        .bind(scheduled.id)
        .bind(scheduled.kind)
        .bind(scheduled.kind.title())
        .bind(&scheduled.message)
        .bind(scheduled.entity_id)
        .bind(scheduled.kind.requires_confirmation())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write inbox entry", e))?;
        Ok(())
    }

    /// List inbox entries for a user.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<InboxNotification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
        })?;

        let items = sqlx::query_as::<_, InboxNotification>(
            "SELECT * FROM notifications WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
        })?;

        Ok(PageResponse::from_request(items, page, total))
    }

    /// Count unread entries.
    pub async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Mark one entry read. Returns `false` if it does not belong to the user.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every entry of a user read.
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    /// Acknowledge an entry that asks for it; also marks it read. Returns
    /// `false` if the entry is not the user's or needs no confirmation.
    pub async fn confirm(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET confirmed_at = COALESCE(confirmed_at, NOW()), \
             is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2 AND requires_confirmation",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to confirm", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete one entry. Returns `false` if it does not belong to the user.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
