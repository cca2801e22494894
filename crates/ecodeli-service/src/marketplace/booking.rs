//! Service bookings between clients and validated providers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use ecodeli_auth::RbacEnforcer;
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_database::repositories::{BookingRepository, UserRepository};
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::booking::{Booking, BookingStatus, CreateBooking};
use ecodeli_entity::user::UserRole;

use crate::context::RequestContext;
use crate::notification::{ReminderEvent, ReminderWriter};

/// A client's booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingInput {
    /// The provider being booked.
    pub provider_id: Uuid,
    /// What is booked.
    pub service_name: String,
    /// Start of the service.
    pub starts_at: DateTime<Utc>,
    /// Length in minutes.
    pub duration_minutes: i32,
    /// Agreed price in cents.
    pub price_cents: i64,
}

impl BookingInput {
    fn validate(&self, now: DateTime<Utc>) -> AppResult<()> {
        if self.starts_at <= now {
            return Err(AppError::validation("Booking must start in the future"));
        }
        if self.duration_minutes <= 0 {
            return Err(AppError::validation("Duration must be positive"));
        }
        if self.price_cents < 0 {
            return Err(AppError::validation("Price cannot be negative"));
        }
        Ok(())
    }
}

/// Booking lifecycle.
#[derive(Debug, Clone)]
pub struct BookingService {
    booking_repo: Arc<BookingRepository>,
    user_repo: Arc<UserRepository>,
    reminders: Arc<ReminderWriter>,
    rbac: RbacEnforcer,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        user_repo: Arc<UserRepository>,
        reminders: Arc<ReminderWriter>,
    ) -> Self {
        Self {
            booking_repo,
            user_repo,
            reminders,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Books an approved provider and schedules the reminders.
    pub async fn create(&self, ctx: &RequestContext, input: BookingInput) -> AppResult<Booking> {
        self.rbac
            .require_any_role(ctx.role, &[UserRole::Client, UserRole::Merchant])?;
        let now = Utc::now();
        input.validate(now)?;

        let provider = self
            .user_repo
            .find_by_id(input.provider_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Provider {} not found", input.provider_id))
            })?;
        if provider.role != UserRole::Provider {
            return Err(AppError::validation("The booked user is not a provider"));
        }
        if !provider.is_validated() {
            return Err(AppError::conflict("Provider is not validated yet"));
        }

        let booking = self
            .booking_repo
            .create(&CreateBooking {
                client_id: ctx.user_id,
                provider_id: provider.id,
                service_name: input.service_name,
                starts_at: input.starts_at,
                duration_minutes: input.duration_minutes,
                price_cents: input.price_cents,
            })
            .await?;

        self.reminders
            .schedule_reminders_for(&ReminderEvent::booking_scheduled(&booking), now)
            .await;

        info!(booking_id = %booking.id, provider_id = %booking.provider_id, "Booking created");
        Ok(booking)
    }

    /// Gets a booking visible to the caller.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Booking> {
        let booking = self.find(id).await?;
        if booking.client_id != ctx.user_id
            && booking.provider_id != ctx.user_id
            && !ctx.is_admin()
        {
            return Err(AppError::authorization("Not a party to this booking"));
        }
        Ok(booking)
    }

    /// Bookings where the caller is client or provider.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Booking>> {
        self.booking_repo.find_for_user(ctx.user_id).await
    }

    /// Provider accepts: `pending → confirmed`.
    pub async fn confirm(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Booking> {
        let booking = self.find(id).await?;
        self.require_provider(ctx, &booking)?;
        self.move_to(ctx, &booking, BookingStatus::Confirmed).await
    }

    /// Provider starts: `confirmed → in_progress`.
    pub async fn start(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Booking> {
        let booking = self.find(id).await?;
        self.require_provider(ctx, &booking)?;
        self.move_to(ctx, &booking, BookingStatus::InProgress).await
    }

    /// Provider finishes: `in_progress → completed`.
    pub async fn complete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Booking> {
        let booking = self.find(id).await?;
        self.require_provider(ctx, &booking)?;
        self.move_to(ctx, &booking, BookingStatus::Completed).await
    }

    /// Either party cancels before the service starts; pending reminders go
    /// with it.
    pub async fn cancel(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Booking> {
        let booking = self.get(ctx, id).await?;
        let cancelled = self.move_to(ctx, &booking, BookingStatus::Cancelled).await?;
        self.reminders
            .cancel_for_entity(booking.id, None, Utc::now())
            .await?;
        Ok(cancelled)
    }

    async fn find(&self, id: Uuid) -> AppResult<Booking> {
        self.booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))
    }

    fn require_provider(&self, ctx: &RequestContext, booking: &Booking) -> AppResult<()> {
        if booking.provider_id == ctx.user_id || ctx.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Only the provider can update this booking"))
        }
    }

    async fn move_to(
        &self,
        ctx: &RequestContext,
        booking: &Booking,
        to: BookingStatus,
    ) -> AppResult<Booking> {
        let from = booking.status;
        if !from.can_transition_to(to) {
            return Err(AppError::invalid_transition("booking", from, to));
        }
        let audit = CreateAuditLogEntry::transition(
            Some(ctx.user_id),
            "booking",
            booking.id,
            to.as_str(),
            from,
            to,
        );
        let updated = self
            .booking_repo
            .transition(booking.id, from, to, &audit)
            .await?
            .ok_or_else(|| AppError::invalid_transition("booking", from, to))?;

        info!(booking_id = %booking.id, %from, %to, "Booking status changed");
        Ok(updated)
    }
}
