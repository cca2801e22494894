//! Admin validation workflow status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account validation status set by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "validation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Waiting for an admin decision.
    Pending,
    /// Documents checked, account may work.
    Approved,
    /// Refused; the reason is stored on the user.
    Rejected,
}

impl ValidationStatus {
    /// All statuses, in declaration order.
    pub const ALL: [ValidationStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Only pending accounts can be decided.
    pub fn can_transition_to(&self, next: ValidationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ecodeli_core::AppError::validation(format!(
                "Invalid validation status: '{s}'. Expected one of: pending, approved, rejected"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_decidable() {
        assert!(ValidationStatus::Pending.can_transition_to(ValidationStatus::Approved));
        assert!(ValidationStatus::Pending.can_transition_to(ValidationStatus::Rejected));
        assert!(!ValidationStatus::Approved.can_transition_to(ValidationStatus::Rejected));
        assert!(!ValidationStatus::Rejected.can_transition_to(ValidationStatus::Approved));
    }
}
