//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace participant roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Posts delivery announcements and books services.
    Client,
    /// Carries parcels for announcements.
    Deliverer,
    /// Offers bookable services.
    Provider,
    /// Shop posting announcements on behalf of its customers.
    Merchant,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// All roles, in declaration order.
    pub const ALL: [UserRole; 5] = [
        Self::Client,
        Self::Deliverer,
        Self::Provider,
        Self::Merchant,
        Self::Admin,
    ];

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles that must be validated by an admin before they can work.
    pub fn requires_validation(&self) -> bool {
        matches!(self, Self::Deliverer | Self::Provider)
    }

    /// Roles allowed to publish announcements.
    pub fn can_post_announcements(&self) -> bool {
        matches!(self, Self::Client | Self::Merchant)
    }

    /// Whether the role can be chosen at self-registration.
    pub fn is_self_registrable(&self) -> bool {
        !self.is_admin()
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Deliverer => "deliverer",
            Self::Provider => "provider",
            Self::Merchant => "merchant",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "deliverer" => Ok(Self::Deliverer),
            "provider" => Ok(Self::Provider),
            "merchant" => Ok(Self::Merchant),
            "admin" => Ok(Self::Admin),
            _ => Err(ecodeli_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: client, deliverer, provider, merchant, admin"
            ))),
        }
    }
}
