//! Scheduled notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;
use super::priority::NotificationPriority;
use super::status::ScheduledStatus;

/// A persisted future reminder or alert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduledNotification {
    /// Unique identifier.
    pub id: Uuid,
    /// User to notify.
    pub recipient_id: Uuid,
    /// Associated entity (announcement, payment, delivery, booking, user).
    pub entity_id: Option<Uuid>,
    /// Reminder category.
    pub kind: NotificationKind,
    /// When the notification becomes due.
    pub scheduled_for: DateTime<Utc>,
    /// Human-readable message.
    pub message: String,
    /// Priority; due rows are delivered highest first.
    pub priority: NotificationPriority,
    /// Delivery status.
    pub status: ScheduledStatus,
    /// Failed attempts so far.
    pub retry_count: i32,
    /// Failed attempts allowed before the row is marked failed.
    pub max_retries: i32,
    /// Error of the last failed attempt.
    pub last_error: Option<String>,
    /// Runner currently holding the row.
    #[serde(skip_serializing)]
    pub claimed_by: Option<String>,
    /// End of the current claim.
    #[serde(skip_serializing)]
    pub claimed_until: Option<DateTime<Utc>>,
    /// When the row was sent.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ScheduledNotification {
    /// Build a pending row from an insert request, as the database would.
    pub fn from_new(new: NewScheduledNotification, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id: new.recipient_id,
            entity_id: new.entity_id,
            kind: new.kind,
            scheduled_for: new.scheduled_for,
            message: new.message,
            priority: new.priority,
            status: ScheduledStatus::Pending,
            retry_count: 0,
            max_retries: new.max_retries,
            last_error: None,
            claimed_by: None,
            claimed_until: None,
            sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the row is pending and its time has come.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ScheduledStatus::Pending && self.scheduled_for <= now
    }

    /// Whether another runner holds an unexpired claim on the row.
    pub fn is_claimed(&self, now: DateTime<Utc>) -> bool {
        self.claimed_until.is_some_and(|until| until > now)
    }
}

/// Data required to schedule a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduledNotification {
    /// User to notify.
    pub recipient_id: Uuid,
    /// Associated entity.
    pub entity_id: Option<Uuid>,
    /// Reminder category.
    pub kind: NotificationKind,
    /// Due time.
    pub scheduled_for: DateTime<Utc>,
    /// Message.
    pub message: String,
    /// Priority.
    pub priority: NotificationPriority,
    /// Retry cap.
    pub max_retries: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(scheduled_for: DateTime<Utc>) -> NewScheduledNotification {
        NewScheduledNotification {
            recipient_id: Uuid::new_v4(),
            entity_id: None,
            kind: NotificationKind::PaymentPending,
            scheduled_for,
            message: "pay".into(),
            priority: NotificationPriority::Normal,
            max_retries: 3,
        }
    }

    #[test]
    fn test_due_boundary_is_inclusive() {
        let now = Utc::now();
        let row = ScheduledNotification::from_new(sample(now), now);
        assert!(row.is_due(now));
        assert!(!row.is_due(now - Duration::seconds(1)));
    }

    #[test]
    fn test_terminal_rows_are_never_due() {
        let now = Utc::now();
        let mut row = ScheduledNotification::from_new(sample(now - Duration::hours(1)), now);
        row.status = ScheduledStatus::Sent;
        assert!(!row.is_due(now));
    }

    #[test]
    fn test_claim_expiry() {
        let now = Utc::now();
        let mut row = ScheduledNotification::from_new(sample(now), now);
        assert!(!row.is_claimed(now));
        row.claimed_until = Some(now + Duration::seconds(30));
        assert!(row.is_claimed(now));
        assert!(!row.is_claimed(now + Duration::seconds(31)));
    }
}
