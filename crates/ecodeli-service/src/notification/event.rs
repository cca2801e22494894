//! Domain events that produce reminders, and events announced right away.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use ecodeli_core::config::notification::{ReminderRule, ReminderTables};
use ecodeli_entity::announcement::Announcement;
use ecodeli_entity::bid::Bid;
use ecodeli_entity::booking::Booking;
use ecodeli_entity::delivery::Delivery;
use ecodeli_entity::notification::{NotificationKind, NotificationPriority};
use ecodeli_entity::payment::Payment;
use ecodeli_entity::user::User;

use crate::payment::service::DEFAULT_CURRENCY;

/// Which reminder table an event draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderTrigger {
    /// An announcement went live and waits for a bid.
    AnnouncementPublished,
    /// A payment was created and is not settled.
    PaymentPending,
    /// A bid was accepted and waits for the deliverer's confirmation.
    MatchExpiring,
    /// A delivery was assigned with a pickup time.
    DeliveryScheduled,
    /// A service booking was created.
    BookingScheduled,
    /// A parcel was marked delivered and waits for the client.
    DeliveryDelivered,
    /// An admin approved an account.
    AccountValidated,
}

impl ReminderTrigger {
    /// Notification kind written on every row of this trigger.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::AnnouncementPublished => NotificationKind::AnnouncementUnmatched,
            Self::PaymentPending => NotificationKind::PaymentPending,
            Self::MatchExpiring => NotificationKind::MatchExpiring,
            Self::DeliveryScheduled => NotificationKind::PickupReminder,
            Self::BookingScheduled => NotificationKind::BookingReminder,
            Self::DeliveryDelivered => NotificationKind::DeliveryValidation,
            Self::AccountValidated => NotificationKind::AccountValidated,
        }
    }

    /// The configured rules for this trigger.
    pub fn rules<'a>(&self, tables: &'a ReminderTables) -> &'a [ReminderRule] {
        match self {
            Self::AnnouncementPublished => &tables.announcement_published,
            Self::PaymentPending => &tables.payment_pending,
            Self::MatchExpiring => &tables.match_expiring,
            Self::DeliveryScheduled => &tables.delivery_scheduled,
            Self::BookingScheduled => &tables.booking_scheduled,
            Self::DeliveryDelivered => &tables.delivery_delivered,
            Self::AccountValidated => &tables.account_validated,
        }
    }
}

/// A domain event with the timestamp its reminders are anchored on.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderEvent {
    /// Reminder table to apply.
    pub trigger: ReminderTrigger,
    /// Offsets are applied to this timestamp.
    pub anchor: DateTime<Utc>,
    /// Entity the reminders are about; used to cancel them later.
    pub entity_id: Option<Uuid>,
    /// Users receiving one row per rule each.
    pub recipients: Vec<Uuid>,
    /// Substituted for `{label}` in rule messages.
    pub label: String,
}

impl ReminderEvent {
    /// Anchored on publication; reminds the author while nobody is matched.
    pub fn announcement_published(
        announcement: &Announcement,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            trigger: ReminderTrigger::AnnouncementPublished,
            anchor: published_at,
            entity_id: Some(announcement.id),
            recipients: vec![announcement.author_id],
            label: announcement.title.clone(),
        }
    }

    /// Anchored on the match expiry; reminds the matched deliverer.
    pub fn match_expiring(
        announcement: &Announcement,
        deliverer_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            trigger: ReminderTrigger::MatchExpiring,
            anchor: expires_at,
            entity_id: Some(announcement.id),
            recipients: vec![deliverer_id],
            label: announcement.title.clone(),
        }
    }

    /// Anchored on the pickup time; reminds both the deliverer and the client.
    pub fn delivery_scheduled(delivery: &Delivery, label: &str) -> Self {
        Self {
            trigger: ReminderTrigger::DeliveryScheduled,
            anchor: delivery.pickup_at,
            entity_id: Some(delivery.id),
            recipients: vec![delivery.deliverer_id, delivery.client_id],
            label: label.to_string(),
        }
    }

    /// Anchored on the moment the parcel was delivered; asks the client to
    /// confirm.
    pub fn delivery_delivered(
        delivery: &Delivery,
        delivered_at: DateTime<Utc>,
        label: &str,
    ) -> Self {
        Self {
            trigger: ReminderTrigger::DeliveryDelivered,
            anchor: delivered_at,
            entity_id: Some(delivery.id),
            recipients: vec![delivery.client_id],
            label: label.to_string(),
        }
    }

    /// Anchored on the booking start; reminds both parties.
    pub fn booking_scheduled(booking: &Booking) -> Self {
        Self {
            trigger: ReminderTrigger::BookingScheduled,
            anchor: booking.starts_at,
            entity_id: Some(booking.id),
            recipients: vec![booking.client_id, booking.provider_id],
            label: booking.service_name.clone(),
        }
    }

    /// Anchored on payment creation.
    pub fn payment_pending(payment: &Payment) -> Self {
        Self {
            trigger: ReminderTrigger::PaymentPending,
            anchor: payment.created_at,
            entity_id: Some(payment.id),
            recipients: vec![payment.user_id],
            label: format_amount(payment.amount_cents, &payment.currency),
        }
    }

    /// Anchored on the admin decision.
    pub fn account_validated(user: &User, decided_at: DateTime<Utc>) -> Self {
        Self {
            trigger: ReminderTrigger::AccountValidated,
            anchor: decided_at,
            entity_id: Some(user.id),
            recipients: vec![user.id],
            label: format!("Welcome {}, your {} account is approved.", user.name, user.role),
        }
    }
}

/// A marketplace event announced to its recipients immediately.
#[derive(Debug, Clone, Serialize)]
pub struct EventNotice {
    /// Category written on every row.
    pub kind: NotificationKind,
    /// Announcement the event is about.
    pub entity_id: Option<Uuid>,
    /// Users receiving one row each.
    pub recipients: Vec<Uuid>,
    /// Body text.
    pub message: String,
    /// Urgency.
    pub priority: NotificationPriority,
}

impl EventNotice {
    fn about(
        announcement: &Announcement,
        kind: NotificationKind,
        recipients: Vec<Uuid>,
        message: String,
        priority: NotificationPriority,
    ) -> Self {
        Self {
            kind,
            entity_id: Some(announcement.id),
            recipients,
            message,
            priority,
        }
    }

    /// Tells approved deliverers a new announcement is open for bids.
    pub fn new_announcement(announcement: &Announcement, deliverers: Vec<Uuid>) -> Self {
        Self::about(
            announcement,
            NotificationKind::NewAnnouncement,
            deliverers,
            format!(
                "\"{}\" from {} to {}, offered {}",
                announcement.title,
                announcement.pickup_address,
                announcement.delivery_address,
                format_amount(announcement.price_cents, DEFAULT_CURRENCY)
            ),
            NotificationPriority::Low,
        )
    }

    /// Tells the author someone bid.
    pub fn new_bid(announcement: &Announcement, bid: &Bid) -> Self {
        Self::about(
            announcement,
            NotificationKind::NewBid,
            vec![announcement.author_id],
            format!(
                "A deliverer offered {} for \"{}\"",
                format_amount(bid.price_cents, DEFAULT_CURRENCY),
                announcement.title
            ),
            NotificationPriority::Normal,
        )
    }

    /// Tells the winning deliverer their bid was accepted.
    pub fn bid_accepted(announcement: &Announcement, deliverer_id: Uuid) -> Self {
        Self::about(
            announcement,
            NotificationKind::BidAccepted,
            vec![deliverer_id],
            format!(
                "Your bid for \"{}\" was accepted. Confirm the assignment before the match expires.",
                announcement.title
            ),
            NotificationPriority::High,
        )
    }

    /// Tells the author the parcel is on its way.
    pub fn delivery_started(announcement: &Announcement) -> Self {
        Self::about(
            announcement,
            NotificationKind::DeliveryStarted,
            vec![announcement.author_id],
            format!("The deliverer picked up \"{}\"", announcement.title),
            NotificationPriority::Normal,
        )
    }

    /// Asks the author to confirm reception.
    pub fn delivery_completed(announcement: &Announcement) -> Self {
        Self::about(
            announcement,
            NotificationKind::DeliveryCompleted,
            vec![announcement.author_id],
            format!(
                "\"{}\" was delivered. Confirm reception with your validation code.",
                announcement.title
            ),
            NotificationPriority::High,
        )
    }

    /// Tells the deliverer the client confirmed reception.
    pub fn delivery_confirmed(announcement: &Announcement, deliverer_id: Uuid) -> Self {
        Self::about(
            announcement,
            NotificationKind::DeliveryConfirmed,
            vec![deliverer_id],
            format!("The client confirmed reception of \"{}\"", announcement.title),
            NotificationPriority::Normal,
        )
    }

    /// Tells the deliverer the announcement they were on is gone.
    pub fn announcement_cancelled(announcement: &Announcement, deliverer_id: Uuid) -> Self {
        Self::about(
            announcement,
            NotificationKind::AnnouncementCancelled,
            vec![deliverer_id],
            format!("\"{}\" was cancelled by its author", announcement.title),
            NotificationPriority::High,
        )
    }
}

fn format_amount(cents: i64, currency: &str) -> String {
    format!("{}.{:02} {}", cents / 100, (cents % 100).abs(), currency)
}
