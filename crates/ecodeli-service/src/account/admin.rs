//! Admin account management: listing and the validation workflow.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use ecodeli_auth::RbacEnforcer;
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_database::repositories::UserRepository;
use ecodeli_entity::user::{User, UserRole, ValidationStatus};

use crate::context::RequestContext;
use crate::notification::{ReminderEvent, ReminderWriter};

/// Admin verdict on a pending account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationDecision {
    Approve,
    Reject,
}

impl ValidationDecision {
    /// Target status and stored reason. A rejection needs a non-blank reason.
    pub fn resolve(self, reason: Option<&str>) -> AppResult<(ValidationStatus, Option<String>)> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        match self {
            Self::Approve => Ok((ValidationStatus::Approved, None)),
            Self::Reject => reason
                .map(|r| (ValidationStatus::Rejected, Some(r.to_string())))
                .ok_or_else(|| AppError::validation("A rejection requires a reason")),
        }
    }
}

/// Admin-only account operations.
#[derive(Debug, Clone)]
pub struct AdminAccountService {
    user_repo: Arc<UserRepository>,
    reminders: Arc<ReminderWriter>,
    rbac: RbacEnforcer,
}

impl AdminAccountService {
    /// Creates a new admin account service.
    pub fn new(user_repo: Arc<UserRepository>, reminders: Arc<ReminderWriter>) -> Self {
        Self {
            user_repo,
            reminders,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Lists accounts, optionally by role and validation status.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        role: Option<UserRole>,
        validation: Option<ValidationStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.rbac.require_admin(ctx.role)?;
        self.user_repo.list(role, validation, page).await
    }

    /// Gets any account.
    pub async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> AppResult<User> {
        self.rbac.require_admin(ctx.role)?;
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Approves or rejects a pending account. Approval schedules the
    /// account-validated notification.
    pub async fn validate_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        decision: ValidationDecision,
        reason: Option<&str>,
    ) -> AppResult<User> {
        self.rbac.require_admin(ctx.role)?;
        let (to, reason) = decision.resolve(reason)?;

        let user = self.get_user(ctx, id).await?;
        let from = user.validation_status;
        if !from.can_transition_to(to) {
            return Err(AppError::invalid_transition("account", from, to));
        }

        let updated = self
            .user_repo
            .set_validation(id, from, to, reason.as_deref(), ctx.user_id)
            .await?
            .ok_or_else(|| AppError::invalid_transition("account", from, to))?;

        if to == ValidationStatus::Approved {
            let now = Utc::now();
            self.reminders
                .schedule_reminders_for(&ReminderEvent::account_validated(&updated, now), now)
                .await;
        }

        info!(user_id = %id, admin_id = %ctx.user_id, %from, %to, "Account validation decided");
        Ok(updated)
    }
}
