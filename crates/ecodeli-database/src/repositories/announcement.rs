//! Announcement repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::announcement::{Announcement, AnnouncementStatus, CreateAnnouncement};
use ecodeli_entity::audit::CreateAuditLogEntry;

use super::audit::transition_with_audit;

/// Repository for announcements.
#[derive(Debug, Clone)]
pub struct AnnouncementRepository {
    pool: PgPool,
}

/// Extra columns written alongside a status change.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementPatch {
    /// New deliverer (`Some(None)` clears it).
    pub deliverer_id: Option<Option<Uuid>>,
    /// New match expiry (`Some(None)` clears it).
    pub match_expires_at: Option<Option<DateTime<Utc>>>,
}

impl AnnouncementRepository {
    /// Create a new announcement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an announcement by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        sqlx::query_as::<_, Announcement>("SELECT * FROM announcements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find announcement", e)
            })
    }

    /// Create a draft announcement.
    pub async fn create(&self, data: &CreateAnnouncement) -> AppResult<Announcement> {
        sqlx::query_as::<_, Announcement>(
            "INSERT INTO announcements (id, author_id, title, description, kind, pickup_address, \
             delivery_address, pickup_at, deadline, price_cents, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'draft', NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.author_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.kind)
        .bind(&data.pickup_address)
        .bind(&data.delivery_address)
        .bind(data.pickup_at)
        .bind(data.deadline)
        .bind(data.price_cents)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create announcement", e))
    }

    /// List announcements, optionally filtered by status and author.
    pub async fn list(
        &self,
        status: Option<AnnouncementStatus>,
        author_id: Option<Uuid>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Announcement>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM announcements \
             WHERE ($1::announcement_status IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR author_id = $2)",
        )
        .bind(status)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count announcements", e)
        })?;

        let items = sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements \
             WHERE ($1::announcement_status IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR author_id = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(status)
        .bind(author_id)
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list announcements", e)
        })?;

        Ok(PageResponse::from_request(items, page, total))
    }

    /// Move an announcement from `from` to `to`, writing an audit entry.
    ///
    /// Returns `None` if the announcement is not currently in `from`.
    pub async fn transition(
        &self,
        id: Uuid,
        from: AnnouncementStatus,
        to: AnnouncementStatus,
        patch: AnnouncementPatch,
        audit: &CreateAuditLogEntry,
    ) -> AppResult<Option<Announcement>> {
        let update = sqlx::query_as::<_, Announcement>(
            "UPDATE announcements SET status = $3, \
                 deliverer_id = CASE WHEN $4 THEN $5 ELSE deliverer_id END, \
                 match_expires_at = CASE WHEN $6 THEN $7 ELSE match_expires_at END, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(patch.deliverer_id.is_some())
        .bind(patch.deliverer_id.flatten())
        .bind(patch.match_expires_at.is_some())
        .bind(patch.match_expires_at.flatten());

        transition_with_audit(&self.pool, update, audit).await
    }

    /// Active announcements whose deadline has passed.
    pub async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Announcement>> {
        sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements WHERE status = 'active' AND deadline <= $1 \
             ORDER BY deadline ASC LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find expired announcements", e)
        })
    }

    /// Matched announcements whose match lapsed without confirmation.
    pub async fn find_lapsed_matches(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Announcement>> {
        sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements WHERE status = 'matched' AND match_expires_at <= $1 \
             ORDER BY match_expires_at ASC LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find lapsed matches", e)
        })
    }
}
