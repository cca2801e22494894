//! Audit log repository implementation.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an entry on an existing connection or transaction.
    pub async fn insert_with(
        conn: &mut PgConnection,
        entry: &CreateAuditLogEntry,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log \
             (id, actor_id, action, target_type, target_id, from_status, to_status, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.target_type)
        .bind(entry.target_id)
        .bind(&entry.from_status)
        .bind(&entry.to_status)
        .bind(&entry.details)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write audit entry", e))?;
        Ok(())
    }

    /// List entries for one target, newest first.
    pub async fn find_by_target(
        &self,
        target_type: &str,
        target_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log WHERE target_type = $1 AND target_id = $2",
        )
        .bind(target_type)
        .bind(target_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE target_type = $1 AND target_id = $2 \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(target_type)
        .bind(target_id)
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list audit entries", e)
        })?;

        Ok(PageResponse::from_request(entries, page, total))
    }
}

/// Run a status-gated `UPDATE ... RETURNING *` and, when it matched a row,
/// write the audit entry in the same transaction.
///
/// Returns `None` when the `WHERE id = .. AND status = ..` guard matched
/// nothing, which callers turn into a not-found or conflict error.
pub(crate) async fn transition_with_audit<'q, T>(
    pool: &PgPool,
    update: QueryAs<'q, Postgres, T, PgArguments>,
    audit: &CreateAuditLogEntry,
) -> AppResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to open transaction", e))?;

    let row = update
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update status", e))?;

    if row.is_some() {
        AuditLogRepository::insert_with(&mut *tx, audit).await?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transition", e))?;
    Ok(row)
}
