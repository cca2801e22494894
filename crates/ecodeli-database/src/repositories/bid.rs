//! Bid repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::bid::{Bid, BidStatus, CreateBid};

/// Repository for deliverer bids.
#[derive(Debug, Clone)]
pub struct BidRepository {
    pool: PgPool,
}

impl BidRepository {
    /// Create a new bid repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a bid by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bid>> {
        sqlx::query_as::<_, Bid>("SELECT * FROM bids WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find bid", e))
    }

    /// Place a bid. A deliverer may hold only one pending bid per announcement.
    pub async fn create(&self, data: &CreateBid) -> AppResult<Bid> {
        sqlx::query_as::<_, Bid>(
            "INSERT INTO bids (id, announcement_id, deliverer_id, price_cents, message, status, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, 'pending', NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.announcement_id)
        .bind(data.deliverer_id)
        .bind(data.price_cents)
        .bind(&data.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("A pending bid already exists for this announcement")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create bid", e),
        })
    }

    /// Bids placed on an announcement, oldest first.
    pub async fn find_by_announcement(&self, announcement_id: Uuid) -> AppResult<Vec<Bid>> {
        sqlx::query_as::<_, Bid>(
            "SELECT * FROM bids WHERE announcement_id = $1 ORDER BY created_at ASC",
        )
        .bind(announcement_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list bids", e))
    }

    /// Gated status change. Returns `None` if the bid is not in `from`.
    pub async fn transition(
        &self,
        id: Uuid,
        from: BidStatus,
        to: BidStatus,
    ) -> AppResult<Option<Bid>> {
        sqlx::query_as::<_, Bid>(
            "UPDATE bids SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update bid", e))
    }

    /// Reject every other pending bid once one has been accepted.
    pub async fn reject_others(&self, announcement_id: Uuid, accepted_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE bids SET status = 'rejected', updated_at = NOW() \
             WHERE announcement_id = $1 AND id <> $2 AND status = 'pending'",
        )
        .bind(announcement_id)
        .bind(accepted_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reject bids", e))?;
        Ok(result.rows_affected())
    }

    /// Put the accepted bid back to rejected when its match lapses.
    pub async fn reject_accepted(&self, announcement_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE bids SET status = 'rejected', updated_at = NOW() \
             WHERE announcement_id = $1 AND status = 'accepted'",
        )
        .bind(announcement_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reject bid", e))?;
        Ok(result.rows_affected())
    }
}
