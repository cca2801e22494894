//! Payment status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Created, waiting for the provider's confirmation.
    Pending,
    /// Funds captured.
    Completed,
    /// Provider declined.
    Failed,
    /// Captured funds returned to the payer.
    Refunded,
}

impl PaymentStatus {
    /// All statuses, in declaration order.
    pub const ALL: [PaymentStatus; 4] =
        [Self::Pending, Self::Completed, Self::Failed, Self::Refunded];

    /// Check whether `next` is reachable from this status in one step.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::PaymentStatus::*;

    #[test]
    fn test_refund_only_after_completion() {
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Failed.can_transition_to(Completed));
    }
}
