//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::BookingStatus;

/// A client's reservation of a provider's service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: Uuid,
    /// Booking client.
    pub client_id: Uuid,
    /// Booked provider.
    pub provider_id: Uuid,
    /// What is being booked.
    pub service_name: String,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Duration in minutes.
    pub duration_minutes: i32,
    /// Agreed price in cents.
    pub price_cents: i64,
    /// Current status.
    pub status: BookingStatus,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    /// Booking client.
    pub client_id: Uuid,
    /// Booked provider.
    pub provider_id: Uuid,
    /// Service name.
    pub service_name: String,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Duration in minutes.
    pub duration_minutes: i32,
    /// Price in cents.
    pub price_cents: i64,
}
