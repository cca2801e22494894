//! Bid entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Status of a deliverer's bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bid_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    /// Waiting for the announcement owner.
    Pending,
    /// Chosen by the owner.
    Accepted,
    /// Another bid was accepted.
    Rejected,
    /// Pulled back by the deliverer.
    Withdrawn,
}

impl BidStatus {
    /// Only pending bids can be decided or withdrawn.
    pub fn can_transition_to(&self, next: BidStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Withdrawn)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deliverer's proposal against an announcement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bid {
    /// Unique bid identifier.
    pub id: Uuid,
    /// Target announcement.
    pub announcement_id: Uuid,
    /// Bidding deliverer.
    pub deliverer_id: Uuid,
    /// Proposed price in cents.
    pub price_cents: i64,
    /// Optional note to the client.
    pub message: Option<String>,
    /// Current status.
    pub status: BidStatus,
    /// When the bid was placed.
    pub created_at: DateTime<Utc>,
    /// When the bid was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to place a bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBid {
    /// Target announcement.
    pub announcement_id: Uuid,
    /// Bidding deliverer.
    pub deliverer_id: Uuid,
    /// Proposed price in cents.
    pub price_cents: i64,
    /// Optional note.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decided_bids_are_frozen() {
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Accepted));
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Withdrawn));
        assert!(!BidStatus::Accepted.can_transition_to(BidStatus::Withdrawn));
        assert!(!BidStatus::Rejected.can_transition_to(BidStatus::Accepted));
    }
}
