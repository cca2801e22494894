//! Delivery status of a scheduled notification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery status of a scheduled notification.
///
/// `pending` is the only mutable state; the runner moves a row to `sent`
/// or `failed`, or back to `pending` with a later timestamp, and
/// cancellation moves it to `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scheduled_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduledStatus {
    /// Waiting for its scheduled time (or for a retry).
    Pending,
    /// Delivered.
    Sent,
    /// Retry cap reached.
    Failed,
    /// Cancelled before delivery.
    Cancelled,
}

impl ScheduledStatus {
    /// All statuses, in declaration order.
    pub const ALL: [ScheduledStatus; 4] =
        [Self::Pending, Self::Sent, Self::Failed, Self::Cancelled];

    /// Terminal rows are never mutated again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScheduledStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScheduledStatus {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ecodeli_core::AppError::validation(format!(
                    "Invalid notification status: '{s}'. Expected one of: pending, sent, failed, cancelled"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_mutable() {
        assert!(!ScheduledStatus::Pending.is_terminal());
        assert!(ScheduledStatus::Sent.is_terminal());
        assert!(ScheduledStatus::Failed.is_terminal());
        assert!(ScheduledStatus::Cancelled.is_terminal());
    }
}
