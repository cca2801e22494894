//! Notification priority.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority of a scheduled notification.
///
/// Variants are declared from lowest to highest so that both the derived
/// `Ord` and the Postgres enum order sort by urgency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "notification_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Default.
    Normal,
    /// Needs attention soon.
    High,
    /// Needs attention now.
    Urgent,
}

impl NotificationPriority {
    /// Return the priority as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for NotificationPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationPriority {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ecodeli_core::AppError::validation(format!(
                "Invalid notification priority: '{s}'. Expected one of: low, normal, high, urgent"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationPriority::*;
    use super::*;

    #[test]
    fn test_ordering_follows_urgency() {
        let mut priorities = vec![Normal, Urgent, Low, High];
        priorities.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, vec![Urgent, High, Normal, Low]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("URGENT".parse::<NotificationPriority>().unwrap(), Urgent);
        assert!("critical".parse::<NotificationPriority>().is_err());
    }
}
