//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable record of a status transition or admin action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The user who performed the action, `None` for the scheduler.
    pub actor_id: Option<Uuid>,
    /// The action that was performed (e.g. `"announcement.publish"`).
    pub action: String,
    /// The type of target resource (e.g. `"announcement"`, `"user"`).
    pub target_type: String,
    /// The target resource ID.
    pub target_id: Uuid,
    /// Status before the action.
    pub from_status: Option<String>,
    /// Status after the action.
    pub to_status: Option<String>,
    /// Additional details (JSON).
    pub details: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// Acting user.
    pub actor_id: Option<Uuid>,
    /// Action performed.
    pub action: String,
    /// Target resource type.
    pub target_type: String,
    /// Target resource ID.
    pub target_id: Uuid,
    /// Status before.
    pub from_status: Option<String>,
    /// Status after.
    pub to_status: Option<String>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}

impl CreateAuditLogEntry {
    /// Entry for a status transition.
    pub fn transition(
        actor_id: Option<Uuid>,
        target_type: &str,
        target_id: Uuid,
        action: &str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self {
            actor_id,
            action: format!("{target_type}.{action}"),
            target_type: target_type.to_string(),
            target_id,
            from_status: Some(from.to_string()),
            to_status: Some(to.to_string()),
            details: None,
        }
    }

    /// Attach details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
