//! Delivery queries and the deliverer's in-transit step.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_database::repositories::DeliveryRepository;
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::delivery::{Delivery, DeliveryStatus};

use crate::context::RequestContext;

/// Gated, audited delivery status change.
pub(crate) async fn transition_delivery(
    repo: &DeliveryRepository,
    delivery: &Delivery,
    to: DeliveryStatus,
    actor: Option<Uuid>,
) -> AppResult<Delivery> {
    let from = delivery.status;
    if !from.can_transition_to(to) {
        return Err(AppError::invalid_transition("delivery", from, to));
    }

    let audit =
        CreateAuditLogEntry::transition(actor, "delivery", delivery.id, to.as_str(), from, to);
    let updated = repo
        .transition(delivery.id, from, to, Utc::now(), &audit)
        .await?
        .ok_or_else(|| AppError::invalid_transition("delivery", from, to))?;

    info!(delivery_id = %delivery.id, %from, %to, "Delivery status changed");
    Ok(updated)
}

/// Read access to deliveries for the parties involved.
#[derive(Debug, Clone)]
pub struct DeliveryService {
    delivery_repo: Arc<DeliveryRepository>,
}

impl DeliveryService {
    /// Creates a new delivery service.
    pub fn new(delivery_repo: Arc<DeliveryRepository>) -> Self {
        Self { delivery_repo }
    }

    /// Gets a delivery visible to the caller.
    ///
    /// The validation code is only shown to the client.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Delivery> {
        let delivery = self
            .delivery_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Delivery {id} not found")))?;
        redact_for(ctx, delivery)
    }

    /// Deliveries where the caller is deliverer or client.
    pub async fn list_for_user(&self, ctx: &RequestContext) -> AppResult<Vec<Delivery>> {
        let deliveries = self.delivery_repo.find_for_user(ctx.user_id).await?;
        deliveries
            .into_iter()
            .map(|d| redact_for(ctx, d))
            .collect()
    }

    /// The deliverer reports the parcel on the way: `picked_up → in_transit`.
    pub async fn mark_in_transit(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Delivery> {
        let delivery = self
            .delivery_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Delivery {id} not found")))?;
        if delivery.deliverer_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the assigned deliverer can update this delivery",
            ));
        }
        let updated = transition_delivery(
            &self.delivery_repo,
            &delivery,
            DeliveryStatus::InTransit,
            Some(ctx.user_id),
        )
        .await?;
        redact_for(ctx, updated)
    }
}

pub(crate) fn redact_for(ctx: &RequestContext, mut delivery: Delivery) -> AppResult<Delivery> {
    if delivery.client_id == ctx.user_id || ctx.is_admin() {
        return Ok(delivery);
    }
    if delivery.deliverer_id == ctx.user_id {
        delivery.validation_code.clear();
        return Ok(delivery);
    }
    Err(AppError::authorization("Not a party to this delivery"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ecodeli_entity::user::UserRole;

    fn delivery(client: Uuid, deliverer: Uuid) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: Uuid::new_v4(),
            announcement_id: Uuid::new_v4(),
            deliverer_id: deliverer,
            client_id: client,
            status: DeliveryStatus::Pending,
            validation_code: "123456".into(),
            pickup_at: now,
            picked_up_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_code_visible_to_client_only() {
        let client = Uuid::new_v4();
        let deliverer = Uuid::new_v4();

        let as_client = RequestContext::new(client, UserRole::Client, "c@x.fr".into());
        assert_eq!(
            redact_for(&as_client, delivery(client, deliverer)).unwrap().validation_code,
            "123456"
        );

        let as_deliverer = RequestContext::new(deliverer, UserRole::Deliverer, "d@x.fr".into());
        assert!(
            redact_for(&as_deliverer, delivery(client, deliverer))
                .unwrap()
                .validation_code
                .is_empty()
        );
    }

    #[test]
    fn test_strangers_are_refused() {
        let stranger = RequestContext::new(Uuid::new_v4(), UserRole::Deliverer, "s@x.fr".into());
        let err = redact_for(&stranger, delivery(Uuid::new_v4(), Uuid::new_v4())).unwrap_err();
        assert_eq!(err.kind, ecodeli_core::error::ErrorKind::Authorization);
    }
}
