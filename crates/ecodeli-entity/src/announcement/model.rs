//! Announcement entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::AnnouncementStatus;

/// What the client is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    /// Carry a parcel from A to B.
    PackageDelivery,
    /// Airport or station transfer of a person.
    PersonTransport,
    /// Grocery or shop run.
    Shopping,
    /// Any other on-site service.
    Service,
}

/// A client-posted request for delivery or service work.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    /// Unique announcement identifier.
    pub id: Uuid,
    /// Owner (client or merchant).
    pub author_id: Uuid,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Kind of work requested.
    pub kind: AnnouncementKind,
    /// Pickup address.
    pub pickup_address: String,
    /// Drop-off address.
    pub delivery_address: String,
    /// Requested pickup time.
    pub pickup_at: DateTime<Utc>,
    /// After this time an unmatched announcement expires.
    pub deadline: DateTime<Utc>,
    /// Offered price in cents, before subscription discount.
    pub price_cents: i64,
    /// Current lifecycle status.
    pub status: AnnouncementStatus,
    /// Deliverer of the accepted bid.
    pub deliverer_id: Option<Uuid>,
    /// When the accepted match lapses without confirmation.
    pub match_expires_at: Option<DateTime<Utc>>,
    /// When the announcement was created.
    pub created_at: DateTime<Utc>,
    /// When the announcement was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Check if the given user owns this announcement.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Data required to create a new announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnouncement {
    /// Owner.
    pub author_id: Uuid,
    /// Short title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Kind of work.
    pub kind: AnnouncementKind,
    /// Pickup address.
    pub pickup_address: String,
    /// Drop-off address.
    pub delivery_address: String,
    /// Requested pickup time.
    pub pickup_at: DateTime<Utc>,
    /// Expiry deadline.
    pub deadline: DateTime<Utc>,
    /// Price in cents.
    pub price_cents: i64,
}
