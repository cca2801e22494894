//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::payment::SubscriptionPlan;
use ecodeli_entity::user::{CreateUser, User, UserRole, ValidationStatus};

use super::audit::transition_with_audit;

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, name, role, validation_status, \
             subscription_plan, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'free', NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.name)
        .bind(data.role)
        .bind(data.validation_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict(format!("Email '{}' is already registered", data.email))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// List users with optional role and validation filters.
    pub async fn list(
        &self,
        role: Option<UserRole>,
        validation: Option<ValidationStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE ($1::user_role IS NULL OR role = $1) \
               AND ($2::validation_status IS NULL OR validation_status = $2)",
        )
        .bind(role)
        .bind(validation)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE ($1::user_role IS NULL OR role = $1) \
               AND ($2::validation_status IS NULL OR validation_status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(role)
        .bind(validation)
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::from_request(users, page, total))
    }

    /// IDs of every approved account with a role, at most `limit`.
    pub async fn find_approved_ids(&self, role: UserRole, limit: i64) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT id FROM users WHERE role = $1 AND validation_status = 'approved' \
             ORDER BY created_at ASC LIMIT $2",
        )
        .bind(role)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list approved users", e))
    }

        /// Move a user's validation status from `from` to `to`.
    ///
    /// Returns `None` if the user was not in `from` (or does not exist).
    pub async fn set_validation(
        &self,
        id: Uuid,
        from: ValidationStatus,
        to: ValidationStatus,
        reason: Option<&str>,
        actor_id: Uuid,
    ) -> AppResult<Option<User>> {
        let update = sqlx::query_as::<_, User>(
            "UPDATE users SET validation_status = $3, rejection_reason = $4, updated_at = NOW() \
             WHERE id = $1 AND validation_status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(reason);

        let mut audit =
            CreateAuditLogEntry::transition(Some(actor_id), "user", id, "validate", from, to);
        if let Some(reason) = reason {
            audit = audit.with_details(serde_json::json!({ "reason": reason }));
        }
        transition_with_audit(&self.pool, update, &audit).await
    }

    /// Change the subscription plan.
    pub async fn update_plan(&self, id: Uuid, plan: SubscriptionPlan) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET subscription_plan = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(plan)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update plan", e))
    }
}
