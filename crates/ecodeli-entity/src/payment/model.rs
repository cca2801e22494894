//! Payment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::PaymentStatus;

/// A payment made by a user for an announcement, booking or subscription.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    /// Unique payment identifier.
    pub id: Uuid,
    /// Paying user.
    pub user_id: Uuid,
    /// Paid entity (announcement, booking), if any.
    pub entity_id: Option<Uuid>,
    /// Amount in cents.
    pub amount_cents: i64,
    /// ISO currency code.
    pub currency: String,
    /// Current status.
    pub status: PaymentStatus,
    /// Reference returned by the payment provider.
    pub provider_reference: Option<String>,
    /// When the payment was created.
    pub created_at: DateTime<Utc>,
    /// When the payment was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayment {
    /// Paying user.
    pub user_id: Uuid,
    /// Paid entity.
    pub entity_id: Option<Uuid>,
    /// Amount in cents.
    pub amount_cents: i64,
    /// ISO currency code.
    pub currency: String,
}
