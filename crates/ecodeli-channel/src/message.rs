//! The payload handed to every channel sender.

use serde::Serialize;
use uuid::Uuid;

use ecodeli_entity::notification::{NotificationKind, NotificationPriority, ScheduledNotification};

/// Contact points of the person being notified.
#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    /// User ID.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Account email address.
    pub email: String,
    /// Phone number, required by SMS.
    pub phone: Option<String>,
    /// Device token, required by push.
    pub push_token: Option<String>,
}

/// One notification ready to leave the platform.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    /// The scheduled row this message was rendered from.
    pub notification_id: Uuid,
    /// Who receives it.
    pub recipient: Recipient,
    /// Reminder category.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Urgency.
    pub priority: NotificationPriority,
    /// Associated announcement, payment, delivery or booking.
    pub entity_id: Option<Uuid>,
}

impl OutboundMessage {
    /// Render a scheduled row for a recipient.
    pub fn from_scheduled(row: &ScheduledNotification, recipient: Recipient) -> Self {
        Self {
            notification_id: row.id,
            recipient,
            kind: row.kind,
            title: row.kind.title().to_string(),
            body: row.message.clone(),
            priority: row.priority,
            entity_id: row.entity_id,
        }
    }
}
