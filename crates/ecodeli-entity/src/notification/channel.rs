//! Delivery channels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A channel a notification can be delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Mobile/web push.
    Push,
    /// Transactional email.
    Email,
    /// Text message.
    Sms,
    /// In-app inbox, always written on a successful delivery.
    InApp,
}

impl NotificationChannel {
    /// Return the channel as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::InApp => "in_app",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
