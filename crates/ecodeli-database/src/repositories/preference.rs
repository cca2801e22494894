//! Notification preference repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::notification::NotificationPreference;

/// Repository for per-user channel preferences.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored preferences, if the user ever saved any.
    pub async fn find(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        sqlx::query_as::<_, NotificationPreference>(
            "SELECT * FROM notification_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load preferences", e))
    }

    /// Stored preferences or the defaults.
    pub async fn find_or_default(&self, user_id: Uuid) -> AppResult<NotificationPreference> {
        Ok(self
            .find(user_id)
            .await?
            .unwrap_or_else(|| NotificationPreference::default_for_user(user_id)))
    }

    /// Insert or replace preferences.
    pub async fn upsert(&self, pref: &NotificationPreference) -> AppResult<NotificationPreference> {
        sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO notification_preferences \
             (user_id, email_enabled, push_enabled, sms_enabled, phone, push_token, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET email_enabled = $2, push_enabled = $3, \
             sms_enabled = $4, phone = $5, push_token = $6, updated_at = NOW() RETURNING *",
        )
        .bind(pref.user_id)
        .bind(pref.email_enabled)
        .bind(pref.push_enabled)
        .bind(pref.sms_enabled)
        .bind(&pref.phone)
        .bind(&pref.push_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save preferences", e))
    }
}
