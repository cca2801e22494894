//! Notification categories: timed reminders and immediate event notices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerated category of a scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Published announcement still has no accepted bid.
    AnnouncementUnmatched,
    /// Payment still pending.
    PaymentPending,
    /// Accepted match about to lapse.
    MatchExpiring,
    /// Upcoming parcel pickup.
    PickupReminder,
    /// Upcoming service booking.
    BookingReminder,
    /// Delivered parcel awaiting client confirmation.
    DeliveryValidation,
    /// Admin decided on the account.
    AccountValidated,
    /// A new announcement is open for bids.
    NewAnnouncement,
    /// Someone bid on the author's announcement.
    NewBid,
    /// The deliverer's bid was accepted.
    BidAccepted,
    /// The deliverer picked the parcel up.
    DeliveryStarted,
    /// The deliverer dropped the parcel off.
    DeliveryCompleted,
    /// The client confirmed reception.
    DeliveryConfirmed,
    /// An announcement the deliverer was working on was cancelled.
    AnnouncementCancelled,
}

impl NotificationKind {
    /// Title used by every channel.
    pub fn title(&self) -> &'static str {
        match self {
            Self::AnnouncementUnmatched => "Your announcement is waiting",
            Self::PaymentPending => "Payment pending",
            Self::MatchExpiring => "Match expiring soon",
            Self::PickupReminder => "Upcoming pickup",
            Self::BookingReminder => "Upcoming booking",
            Self::DeliveryValidation => "Confirm your delivery",
            Self::AccountValidated => "Account review",
            Self::NewAnnouncement => "New announcement available",
            Self::NewBid => "New bid on your announcement",
            Self::BidAccepted => "Your bid was accepted",
            Self::DeliveryStarted => "Delivery in progress",
            Self::DeliveryCompleted => "Delivered, please confirm",
            Self::DeliveryConfirmed => "Delivery confirmed",
            Self::AnnouncementCancelled => "Announcement cancelled",
        }
    }

    /// Whether the recipient is asked to acknowledge the inbox entry.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::BidAccepted | Self::AnnouncementCancelled)
    }

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnnouncementUnmatched => "announcement_unmatched",
            Self::PaymentPending => "payment_pending",
            Self::MatchExpiring => "match_expiring",
            Self::PickupReminder => "pickup_reminder",
            Self::BookingReminder => "booking_reminder",
            Self::DeliveryValidation => "delivery_validation",
            Self::AccountValidated => "account_validated",
            Self::NewAnnouncement => "new_announcement",
            Self::NewBid => "new_bid",
            Self::BidAccepted => "bid_accepted",
            Self::DeliveryStarted => "delivery_started",
            Self::DeliveryCompleted => "delivery_completed",
            Self::DeliveryConfirmed => "delivery_confirmed",
            Self::AnnouncementCancelled => "announcement_cancelled",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_name_matches_as_str() {
        for kind in [
            NotificationKind::PaymentPending,
            NotificationKind::NewAnnouncement,
            NotificationKind::BidAccepted,
            NotificationKind::AnnouncementCancelled,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_only_acknowledged_kinds_require_confirmation() {
        assert!(NotificationKind::BidAccepted.requires_confirmation());
        assert!(NotificationKind::AnnouncementCancelled.requires_confirmation());
        assert!(!NotificationKind::NewBid.requires_confirmation());
        assert!(!NotificationKind::PickupReminder.requires_confirmation());
    }
}
