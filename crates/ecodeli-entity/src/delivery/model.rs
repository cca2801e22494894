//! Delivery entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::DeliveryStatus;

/// A delivery created when a deliverer confirms an announcement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Delivery {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// Source announcement.
    pub announcement_id: Uuid,
    /// Assigned deliverer.
    pub deliverer_id: Uuid,
    /// Announcement owner.
    pub client_id: Uuid,
    /// Current status.
    pub status: DeliveryStatus,
    /// Six-digit code the client hands over at drop-off.
    pub validation_code: String,
    /// Planned pickup time.
    pub pickup_at: DateTime<Utc>,
    /// When the parcel was picked up.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// When the parcel was dropped off.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the delivery was created.
    pub created_at: DateTime<Utc>,
    /// When the delivery was last updated.
    pub updated_at: DateTime<Utc>,
}
