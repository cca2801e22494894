//! Delivery status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a physical delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Created on assignment, waiting for pickup.
    Pending,
    /// Parcel collected by the deliverer.
    PickedUp,
    /// On the way.
    InTransit,
    /// Dropped off; awaiting client confirmation.
    Delivered,
    /// Client confirmed reception.
    Confirmed,
    /// Aborted before transit.
    Cancelled,
}

impl DeliveryStatus {
    /// All statuses, in declaration order.
    pub const ALL: [DeliveryStatus; 6] = [
        Self::Pending,
        Self::PickedUp,
        Self::InTransit,
        Self::Delivered,
        Self::Confirmed,
        Self::Cancelled,
    ];

    /// Check whether `next` is reachable from this status in one step.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, next),
            (Pending, PickedUp)
                | (PickedUp, InTransit)
                | (InTransit, Delivered)
                | (Delivered, Confirmed)
                | (Pending, Cancelled)
                | (PickedUp, Cancelled)
        )
    }

    /// Check if the delivery is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ecodeli_core::AppError::validation(format!("Invalid delivery status: '{s}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::DeliveryStatus::*;
    use super::*;

    #[test]
    fn test_forward_only() {
        assert!(Pending.can_transition_to(PickedUp));
        assert!(InTransit.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(InTransit));
        assert!(!Pending.can_transition_to(Delivered));
    }

    #[test]
    fn test_no_cancel_once_in_transit() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(PickedUp.can_transition_to(Cancelled));
        assert!(!InTransit.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("picked_up".parse::<DeliveryStatus>().unwrap(), PickedUp);
        assert!("lost".parse::<DeliveryStatus>().is_err());
    }
}
