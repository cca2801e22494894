//! Payments and their pending reminders.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use ecodeli_auth::RbacEnforcer;
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_database::repositories::PaymentRepository;
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::notification::NotificationKind;
use ecodeli_entity::payment::{CreatePayment, Payment, PaymentStatus};

use crate::context::RequestContext;
use crate::notification::{ReminderEvent, ReminderWriter};

pub(crate) const DEFAULT_CURRENCY: &str = "EUR";

/// A new payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    /// Amount in cents.
    pub amount_cents: i64,
    /// ISO currency code, `EUR` when absent.
    pub currency: Option<String>,
    /// What is being paid for.
    pub entity_id: Option<Uuid>,
}

/// Payment lifecycle.
#[derive(Debug, Clone)]
pub struct PaymentService {
    payment_repo: Arc<PaymentRepository>,
    reminders: Arc<ReminderWriter>,
    rbac: RbacEnforcer,
}

impl PaymentService {
    /// Creates a new payment service.
    pub fn new(payment_repo: Arc<PaymentRepository>, reminders: Arc<ReminderWriter>) -> Self {
        Self {
            payment_repo,
            reminders,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Creates a pending payment for the caller and schedules the
    /// payment-pending reminders.
    pub async fn create(&self, ctx: &RequestContext, input: PaymentInput) -> AppResult<Payment> {
        if input.amount_cents <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }
        let currency = input
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::validation("Currency must be a 3-letter ISO code"));
        }

        let payment = self
            .payment_repo
            .create(&CreatePayment {
                user_id: ctx.user_id,
                entity_id: input.entity_id,
                amount_cents: input.amount_cents,
                currency,
            })
            .await?;

        self.reminders
            .schedule_reminders_for(&ReminderEvent::payment_pending(&payment), Utc::now())
            .await;

        info!(payment_id = %payment.id, amount_cents = payment.amount_cents, "Payment created");
        Ok(payment)
    }

    /// Gets a payment owned by the caller.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Payment> {
        let payment = self.find(id).await?;
        if !ctx.is_self_or_admin(payment.user_id) {
            return Err(AppError::authorization("Not your payment"));
        }
        Ok(payment)
    }

    /// The caller's payments.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Payment>> {
        self.payment_repo.find_by_user(ctx.user_id).await
    }

    /// Provider confirmed the capture: `pending → completed`.
    pub async fn complete(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        provider_reference: Option<&str>,
    ) -> AppResult<Payment> {
        let payment = self.get(ctx, id).await?;
        let completed = self
            .move_to(ctx, &payment, PaymentStatus::Completed, provider_reference)
            .await?;
        self.cancel_reminders(payment.id).await?;
        Ok(completed)
    }

    /// Provider declined: `pending → failed`.
    pub async fn fail(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Payment> {
        let payment = self.get(ctx, id).await?;
        let failed = self
            .move_to(ctx, &payment, PaymentStatus::Failed, None)
            .await?;
        self.cancel_reminders(payment.id).await?;
        Ok(failed)
    }

    /// Admin: `completed → refunded`.
    pub async fn refund(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Payment> {
        self.rbac.require_admin(ctx.role)?;
        let payment = self.find(id).await?;
        self.move_to(ctx, &payment, PaymentStatus::Refunded, None)
            .await
    }

    async fn find(&self, id: Uuid) -> AppResult<Payment> {
        self.payment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {id} not found")))
    }

    async fn cancel_reminders(&self, payment_id: Uuid) -> AppResult<u64> {
        self.reminders
            .cancel_for_entity(payment_id, Some(&[NotificationKind::PaymentPending]), Utc::now())
            .await
    }

    async fn move_to(
        &self,
        ctx: &RequestContext,
        payment: &Payment,
        to: PaymentStatus,
        provider_reference: Option<&str>,
    ) -> AppResult<Payment> {
        let from = payment.status;
        if !from.can_transition_to(to) {
            return Err(AppError::invalid_transition("payment", from, to));
        }
        let audit = CreateAuditLogEntry::transition(
            Some(ctx.user_id),
            "payment",
            payment.id,
            to.as_str(),
            from,
            to,
        );
        let updated = self
            .payment_repo
            .transition(payment.id, from, to, provider_reference, &audit)
            .await?
            .ok_or_else(|| AppError::invalid_transition("payment", from, to))?;

        info!(payment_id = %payment.id, %from, %to, "Payment status changed");
        Ok(updated)
    }
}
