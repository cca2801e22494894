//! Announcement lifecycle.
//!
//! ```text
//! draft -> active -> matched -> assigned -> in_progress -> delivered -> validated -> completed
//!            |          |          |             |
//!            +----------+----------+-------------+--> cancelled
//!            +--> expired
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a client announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementStatus {
    /// Being edited, not visible to deliverers.
    Draft,
    /// Published and open to bids.
    Active,
    /// A bid was accepted; waiting for the deliverer's confirmation.
    Matched,
    /// The deliverer confirmed; a delivery exists.
    Assigned,
    /// The parcel has been picked up.
    InProgress,
    /// The deliverer reported the drop-off.
    Delivered,
    /// The client confirmed reception.
    Validated,
    /// Closed and paid out.
    Completed,
    /// Cancelled by the owner or an admin.
    Cancelled,
    /// Deadline passed without a match.
    Expired,
}

impl AnnouncementStatus {
    /// All statuses, in declaration order.
    pub const ALL: [AnnouncementStatus; 10] = [
        Self::Draft,
        Self::Active,
        Self::Matched,
        Self::Assigned,
        Self::InProgress,
        Self::Delivered,
        Self::Validated,
        Self::Completed,
        Self::Cancelled,
        Self::Expired,
    ];

    /// Check whether `next` is reachable from this status in one step.
    pub fn can_transition_to(&self, next: AnnouncementStatus) -> bool {
        use AnnouncementStatus::*;
        match (self, next) {
            (Draft, Active)
            | (Active, Matched)
            | (Matched, Assigned)
            | (Assigned, InProgress)
            | (InProgress, Delivered)
            | (Delivered, Validated)
            | (Validated, Completed)
            | (Active, Expired) => true,
            // A refused or lapsed match goes back on the market.
            (Matched, Active) => true,
            (from, Cancelled) => from.is_cancellable(),
            _ => false,
        }
    }

    /// Cancellation is refused once the parcel has been handed over.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::Draft | Self::Active | Self::Matched | Self::Assigned | Self::InProgress
        )
    }

    /// Cancelling from these statuses obliges a refund of the client.
    pub fn requires_refund_on_cancel(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }

    /// Check if the announcement is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Matched => "matched",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Delivered => "delivered",
            Self::Validated => "validated",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for AnnouncementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnnouncementStatus {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ecodeli_core::AppError::validation(format!("Invalid announcement status: '{s}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::AnnouncementStatus::*;
    use super::*;

    #[test]
    fn test_happy_path_is_linear() {
        let path = [
            Draft, Active, Matched, Assigned, InProgress, Delivered, Validated, Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(!Active.can_transition_to(Assigned));
        assert!(!Draft.can_transition_to(Matched));
    }

    #[test]
    fn test_cancel_is_refused_after_handover() {
        for status in [Delivered, Validated, Completed, Cancelled, Expired] {
            assert!(!status.can_transition_to(Cancelled), "{status}");
        }
        assert!(Assigned.can_transition_to(Cancelled));
        assert!(Assigned.requires_refund_on_cancel());
        assert!(InProgress.requires_refund_on_cancel());
        assert!(!Active.requires_refund_on_cancel());
    }

    #[test]
    fn test_only_active_expires() {
        assert!(Active.can_transition_to(Expired));
        assert!(!Matched.can_transition_to(Expired));
        assert!(!Completed.can_transition_to(Expired));
    }

    #[test]
    fn test_from_str_snake_case() {
        assert_eq!("in_progress".parse::<AnnouncementStatus>().unwrap(), InProgress);
        assert_eq!("ACTIVE".parse::<AnnouncementStatus>().unwrap(), Active);
        assert!("published".parse::<AnnouncementStatus>().is_err());
    }
}
