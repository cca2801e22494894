//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::validation::ValidationStatus;
use crate::payment::SubscriptionPlan;

/// A registered marketplace participant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login email, unique.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Full name shown to counterparts.
    pub name: String,
    /// Marketplace role.
    pub role: UserRole,
    /// Admin validation status.
    pub validation_status: ValidationStatus,
    /// Reason given when the account was rejected.
    pub rejection_reason: Option<String>,
    /// Current subscription plan.
    pub subscription_plan: SubscriptionPlan,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the account passed (or never needed) admin validation.
    pub fn is_validated(&self) -> bool {
        self.validation_status == ValidationStatus::Approved
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Full name.
    pub name: String,
    /// Marketplace role.
    pub role: UserRole,
    /// Initial validation status.
    pub validation_status: ValidationStatus,
}
