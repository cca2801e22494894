//! Subscription plans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    /// No fee, no discount.
    Free,
    /// Entry-level paid plan.
    Starter,
    /// Full plan.
    Premium,
}

impl SubscriptionPlan {
    /// All plans, cheapest first.
    pub const ALL: [SubscriptionPlan; 3] = [Self::Free, Self::Starter, Self::Premium];

    /// Monthly fee in cents.
    pub fn monthly_price_cents(&self) -> i64 {
        match self {
            Self::Free => 0,
            Self::Starter => 990,
            Self::Premium => 1999,
        }
    }

    /// Discount on delivery prices, in percent.
    pub fn discount_percent(&self) -> i64 {
        match self {
            Self::Free => 0,
            Self::Starter => 5,
            Self::Premium => 9,
        }
    }

    /// Parcel insurance coverage in euros.
    pub fn insurance_coverage_eur(&self) -> i64 {
        match self {
            Self::Free => 50,
            Self::Starter => 115,
            Self::Premium => 3000,
        }
    }

    /// Apply the plan discount to a price, rounding half up to the cent.
    pub fn apply_discount(&self, price_cents: i64) -> i64 {
        let discount = (price_cents * self.discount_percent() + 50) / 100;
        price_cents - discount
    }

    /// Return the plan as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = ecodeli_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "premium" => Ok(Self::Premium),
            _ => Err(ecodeli_core::AppError::validation(format!(
                "Invalid subscription plan: '{s}'. Expected one of: free, starter, premium"
            ))),
        }
    }
}
