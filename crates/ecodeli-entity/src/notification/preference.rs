//! Notification preference entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::channel::NotificationChannel;

/// Per-user channel switches and contact points.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    /// The user these preferences belong to.
    pub user_id: Uuid,
    /// Deliver by email.
    pub email_enabled: bool,
    /// Deliver by push.
    pub push_enabled: bool,
    /// Deliver by SMS.
    pub sms_enabled: bool,
    /// Phone number for SMS.
    pub phone: Option<String>,
    /// Device token for push.
    pub push_token: Option<String>,
    /// When preferences were last updated.
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Defaults for a user who never saved preferences: email and push on,
    /// SMS off.
    pub fn default_for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_enabled: true,
            push_enabled: true,
            sms_enabled: false,
            phone: None,
            push_token: None,
            updated_at: Utc::now(),
        }
    }

    /// External channels switched on and reachable.
    ///
    /// Push needs a device token and SMS needs a phone number; email always
    /// goes to the account address.
    pub fn external_channels(&self) -> Vec<NotificationChannel> {
        let mut channels = Vec::with_capacity(3);
        if self.push_enabled && self.push_token.is_some() {
            channels.push(NotificationChannel::Push);
        }
        if self.email_enabled {
            channels.push(NotificationChannel::Email);
        }
        if self.sms_enabled && self.phone.is_some() {
            channels.push(NotificationChannel::Sms);
        }
        channels
    }
}
