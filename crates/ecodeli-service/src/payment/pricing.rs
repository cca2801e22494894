//! Subscription plans and plan-discounted quotes.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_database::repositories::UserRepository;
use ecodeli_entity::payment::SubscriptionPlan;
use ecodeli_entity::user::User;

use crate::context::RequestContext;

/// Public description of a plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanInfo {
    pub plan: SubscriptionPlan,
    pub monthly_price_cents: i64,
    pub discount_percent: i64,
    pub insurance_coverage_eur: i64,
}

impl From<SubscriptionPlan> for PlanInfo {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            plan,
            monthly_price_cents: plan.monthly_price_cents(),
            discount_percent: plan.discount_percent(),
            insurance_coverage_eur: plan.insurance_coverage_eur(),
        }
    }
}

/// A delivery price after the caller's plan discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub plan: SubscriptionPlan,
    pub base_price_cents: i64,
    pub discount_cents: i64,
    pub final_price_cents: i64,
}

/// Quote a base price under a plan.
pub fn quote(plan: SubscriptionPlan, base_price_cents: i64) -> Quote {
    let final_price_cents = plan.apply_discount(base_price_cents);
    Quote {
        plan,
        base_price_cents,
        discount_cents: base_price_cents - final_price_cents,
        final_price_cents,
    }
}

/// Plans and quotes.
#[derive(Debug, Clone)]
pub struct PricingService {
    user_repo: Arc<UserRepository>,
}

impl PricingService {
    /// Creates a new pricing service.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Every plan, cheapest first.
    pub fn plans(&self) -> Vec<PlanInfo> {
        SubscriptionPlan::ALL.into_iter().map(PlanInfo::from).collect()
    }

    /// Quote `base_price_cents` under the caller's current plan.
    pub async fn quote(&self, ctx: &RequestContext, base_price_cents: i64) -> AppResult<Quote> {
        if base_price_cents < 0 {
            return Err(AppError::validation("Price cannot be negative"));
        }
        let user = self.current_user(ctx).await?;
        Ok(quote(user.subscription_plan, base_price_cents))
    }

    /// Switch the caller to another plan.
    pub async fn change_plan(
        &self,
        ctx: &RequestContext,
        plan: SubscriptionPlan,
    ) -> AppResult<User> {
        let current = self.current_user(ctx).await?;
        if current.subscription_plan == plan {
            return Ok(current);
        }
        let updated = self
            .user_repo
            .update_plan(ctx.user_id, plan)
            .await?
            .ok_or_else(|| AppError::not_found("Account no longer exists"))?;
        info!(
            user_id = %ctx.user_id,
            from = %current.subscription_plan,
            to = %plan,
            "Plan changed"
        );
        Ok(updated)
    }

    async fn current_user(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account no longer exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_discounts() {
        assert_eq!(quote(SubscriptionPlan::Free, 2000).final_price_cents, 2000);
        assert_eq!(quote(SubscriptionPlan::Starter, 2000).final_price_cents, 1900);
        assert_eq!(quote(SubscriptionPlan::Premium, 2000).final_price_cents, 1820);
    }

    #[test]
    fn test_discount_rounds_to_the_cent() {
        // 9% of 1234 = 111.06
        let q = quote(SubscriptionPlan::Premium, 1234);
        assert_eq!(q.discount_cents, 111);
        assert_eq!(q.final_price_cents, 1123);

        // 5% of 1010 = 50.5, rounded half up
        let q = quote(SubscriptionPlan::Starter, 1010);
        assert_eq!(q.discount_cents, 51);
    }

    #[test]
    fn test_plan_table() {
        let plans: Vec<PlanInfo> = SubscriptionPlan::ALL.into_iter().map(PlanInfo::from).collect();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[1].monthly_price_cents, 990);
        assert_eq!(plans[2].insurance_coverage_eur, 3000);
    }
}
