//! Postgres-backed scheduled-notification store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::notification::{
    NewScheduledNotification, NotificationKind, ScheduledNotification, ScheduledStatus,
};

use super::{ClaimRequest, ScheduledNotificationStore};

/// Scheduled notifications stored in the `scheduled_notifications` table.
#[derive(Debug, Clone)]
pub struct PgScheduledNotificationStore {
    pool: PgPool,
}

impl PgScheduledNotificationStore {
    /// Create a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduledNotificationStore for PgScheduledNotificationStore {
    async fn insert(&self, new: &NewScheduledNotification) -> AppResult<ScheduledNotification> {
        sqlx::query_as::<_, ScheduledNotification>(
            "INSERT INTO scheduled_notifications \
             (id, recipient_id, entity_id, kind, scheduled_for, message, priority, status, \
              retry_count, max_retries, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 0, $8, NOW(), NOW()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.recipient_id)
        .bind(new.entity_id)
        .bind(new.kind)
        .bind(new.scheduled_for)
        .bind(&new.message)
        .bind(new.priority)
        .bind(new.max_retries)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to insert scheduled notification",
                e,
            )
        })
    }

    async fn claim_due(&self, request: &ClaimRequest<'_>) -> AppResult<Vec<ScheduledNotification>> {
        let claimed_until = request.now + request.lease;
        // The subquery locks the candidate rows; RETURNING does not keep the
        // subquery order, so the batch is re-sorted below.
        let mut rows = sqlx::query_as::<_, ScheduledNotification>(
            "UPDATE scheduled_notifications SET claimed_by = $1, claimed_until = $2, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM scheduled_notifications \
                 WHERE status = 'pending' AND scheduled_for <= $3 \
                   AND (claimed_until IS NULL OR claimed_until <= $3) \
                 ORDER BY priority DESC, scheduled_for ASC \
                 LIMIT $4 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING *",
        )
        .bind(request.runner_id)
        .bind(claimed_until)
        .bind(request.now)
        .bind(request.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to claim due notifications", e)
        })?;

        rows.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.scheduled_for.cmp(&b.scheduled_for))
        });
        Ok(rows)
    }

    async fn renew_claim(
        &self,
        id: Uuid,
        runner_id: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications SET claimed_until = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' AND claimed_by = $2",
        )
        .bind(id)
        .bind(runner_id)
        .bind(now + lease)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to renew notification claim", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_sent(&self, id: Uuid, runner_id: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications \
             SET status = 'sent', sent_at = $3, claimed_by = NULL, claimed_until = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' AND claimed_by = $2",
        )
        .bind(id)
        .bind(runner_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark notification sent", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        next_attempt_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications \
             SET retry_count = $3, scheduled_for = $4, last_error = $5, \
                 claimed_by = NULL, claimed_until = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' AND claimed_by = $2 AND $3 < max_retries",
        )
        .bind(id)
        .bind(runner_id)
        .bind(retry_count)
        .bind(next_attempt_at)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reschedule notification", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        error: &str,
        _now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications \
             SET status = 'failed', retry_count = LEAST($3, max_retries), last_error = $4, \
                 claimed_by = NULL, claimed_until = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' AND claimed_by = $2",
        )
        .bind(id)
        .bind(runner_id)
        .bind(retry_count)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark notification failed", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, id: Uuid, runner_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications SET claimed_by = NULL, claimed_until = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' AND claimed_by = $2",
        )
        .bind(id)
        .bind(runner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release notification", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn cancel_for_entity(
        &self,
        entity_id: Uuid,
        kinds: Option<&[NotificationKind]>,
        _now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = match kinds {
            Some(kinds) => {
                sqlx::query(
                    "UPDATE scheduled_notifications SET status = 'cancelled', \
                     claimed_by = NULL, claimed_until = NULL, updated_at = NOW() \
                     WHERE entity_id = $1 AND status = 'pending' AND kind::text = ANY($2)",
                )
                .bind(entity_id)
                .bind(kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "UPDATE scheduled_notifications SET status = 'cancelled', \
                     claimed_by = NULL, claimed_until = NULL, updated_at = NOW() \
                     WHERE entity_id = $1 AND status = 'pending'",
                )
                .bind(entity_id)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to cancel scheduled notifications",
                e,
            )
        })?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ScheduledNotification>> {
        sqlx::query_as::<_, ScheduledNotification>(
            "SELECT * FROM scheduled_notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find scheduled notification", e)
        })
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<ScheduledStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScheduledNotification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM scheduled_notifications \
             WHERE recipient_id = $1 AND ($2::scheduled_status IS NULL OR status = $2)",
        )
        .bind(recipient_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count scheduled notifications", e)
        })?;

        let rows = sqlx::query_as::<_, ScheduledNotification>(
            "SELECT * FROM scheduled_notifications \
             WHERE recipient_id = $1 AND ($2::scheduled_status IS NULL OR status = $2) \
             ORDER BY scheduled_for DESC LIMIT $3 OFFSET $4",
        )
        .bind(recipient_id)
        .bind(status)
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list scheduled notifications", e)
        })?;

        Ok(PageResponse::from_request(rows, page, total))
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ScheduledStatus, i64)>> {
        sqlx::query_as::<_, (ScheduledStatus, i64)>(
            "SELECT status, COUNT(*) FROM scheduled_notifications GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
        })
    }
}
