//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ecodeli_entity::announcement::{AnnouncementKind, AnnouncementStatus};
use ecodeli_entity::notification::ScheduledStatus;
use ecodeli_entity::payment::SubscriptionPlan;
use ecodeli_entity::user::{UserRole, ValidationStatus};
use ecodeli_service::account::{RegisterRequest as SvcRegister, ValidationDecision};
use ecodeli_service::marketplace::{AnnouncementInput, BookingInput};
use ecodeli_service::payment::PaymentInput;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plain-text password; policy is checked by the service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    /// Requested role.
    pub role: UserRole,
}

impl From<RegisterRequest> for SvcRegister {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            name: req.name,
            role: req.role,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// New announcement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    pub kind: AnnouncementKind,
    #[validate(length(min = 1, max = 500))]
    pub pickup_address: String,
    #[validate(length(min = 1, max = 500))]
    pub delivery_address: String,
    pub pickup_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
}

impl From<CreateAnnouncementRequest> for AnnouncementInput {
    fn from(req: CreateAnnouncementRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            kind: req.kind,
            pickup_address: req.pickup_address,
            delivery_address: req.delivery_address,
            pickup_at: req.pickup_at,
            deadline: req.deadline,
            price_cents: req.price_cents,
        }
    }
}

/// Announcement listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementQuery {
    /// Only this status.
    pub status: Option<AnnouncementStatus>,
    /// Only the caller's own announcements.
    #[serde(default)]
    pub mine: bool,
}

/// A deliverer's bid.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceBidRequest {
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// Drop-off code entered by the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ValidateDeliveryRequest {
    #[validate(length(equal = 6, message = "Validation code has 6 digits"))]
    pub code: String,
}

/// Optional cancellation reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// New booking.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub provider_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub service_name: String,
    pub starts_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[validate(range(min = 0))]
    pub price_cents: i64,
}

impl From<CreateBookingRequest> for BookingInput {
    fn from(req: CreateBookingRequest) -> Self {
        Self {
            provider_id: req.provider_id,
            service_name: req.service_name,
            starts_at: req.starts_at,
            duration_minutes: req.duration_minutes,
            price_cents: req.price_cents,
        }
    }
}

/// New payment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,
    #[validate(length(equal = 3, message = "Currency is a 3-letter ISO code"))]
    pub currency: Option<String>,
    pub entity_id: Option<Uuid>,
}

impl From<CreatePaymentRequest> for PaymentInput {
    fn from(req: CreatePaymentRequest) -> Self {
        Self {
            amount_cents: req.amount_cents,
            currency: req.currency,
            entity_id: req.entity_id,
        }
    }
}

/// Provider callback confirming a capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompletePaymentRequest {
    #[validate(length(min = 1, max = 200))]
    pub provider_reference: Option<String>,
}

/// Plan change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePlanRequest {
    pub plan: SubscriptionPlan,
}

/// Price quote query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuoteQuery {
    #[validate(range(min = 0))]
    pub base_price_cents: i64,
}

/// Admin account listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub validation: Option<ValidationStatus>,
}

/// Admin verdict on a pending account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateAccountRequest {
    pub decision: ValidationDecision,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Inbox listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// Scheduled-notification listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduledQuery {
    pub status: Option<ScheduledStatus>,
}
