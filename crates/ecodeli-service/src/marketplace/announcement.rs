//! Announcement lifecycle: publication, bidding, assignment, delivery,
//! validation, cancellation and expiry.
//!
//! Every status change is checked against the transition table first and
//! then applied with a conditional update on the current status, so two
//! concurrent requests cannot both move the same announcement.
//!
//! Besides timed reminders, most transitions queue an immediate notice for
//! the other party. Queuing a notice never fails the transition.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use ecodeli_auth::RbacEnforcer;
use ecodeli_core::config::MarketplaceConfig;
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_database::repositories::announcement::AnnouncementPatch;
use ecodeli_database::repositories::{
    AnnouncementRepository, BidRepository, DeliveryRepository, UserRepository,
};
use ecodeli_entity::announcement::{
    Announcement, AnnouncementKind, AnnouncementStatus, CreateAnnouncement,
};
use ecodeli_entity::audit::CreateAuditLogEntry;
use ecodeli_entity::bid::{Bid, BidStatus, CreateBid};
use ecodeli_entity::delivery::{Delivery, DeliveryStatus};
use ecodeli_entity::notification::NotificationKind;
use ecodeli_entity::user::UserRole;

use super::delivery::redact_for;
use crate::context::RequestContext;
use crate::notification::{EventNotice, ReminderEvent, ReminderWriter};

/// Fields supplied by the author of a new announcement.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementInput {
    /// Short title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// What is being requested.
    pub kind: AnnouncementKind,
    /// Pickup address.
    pub pickup_address: String,
    /// Drop-off address.
    pub delivery_address: String,
    /// Requested pickup time.
    pub pickup_at: DateTime<Utc>,
    /// After this the announcement expires if unmatched.
    pub deadline: DateTime<Utc>,
    /// Offered price in cents.
    pub price_cents: i64,
}

impl AnnouncementInput {
    /// Business checks on a new announcement.
    pub fn validate(&self, min_price_cents: i64, now: DateTime<Utc>) -> AppResult<()> {
        if self.price_cents < min_price_cents {
            return Err(AppError::validation(format!(
                "Price must be at least {min_price_cents} cents"
            )));
        }
        if self.deadline <= now {
            return Err(AppError::validation("Deadline must be in the future"));
        }
        if self.pickup_at > self.deadline {
            return Err(AppError::validation("Pickup must happen before the deadline"));
        }
        Ok(())
    }
}

/// Result of a cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CancelOutcome {
    /// The cancelled announcement.
    pub announcement: Announcement,
    /// Whether the client must be refunded.
    pub refund_required: bool,
    /// Pending reminders cancelled.
    pub reminders_cancelled: u64,
}

/// Notice owed to the deliverer when an announcement is cancelled from
/// `from`; nobody is told when no deliverer was involved yet.
pub fn notice_on_cancel(
    announcement: &Announcement,
    from: AnnouncementStatus,
) -> Option<EventNotice> {
    let involved = matches!(
        from,
        AnnouncementStatus::Matched | AnnouncementStatus::Assigned | AnnouncementStatus::InProgress
    );
    match announcement.deliverer_id {
        Some(deliverer_id) if involved => {
            Some(EventNotice::announcement_cancelled(announcement, deliverer_id))
        }
        _ => None,
    }
}

/// Six-digit code the client hands to the deliverer at drop-off.
pub fn validation_code(seed: Uuid) -> String {
    format!("{:06}", seed.as_u128() % 1_000_000)
}

/// Orchestrates the announcement lifecycle.
#[derive(Debug, Clone)]
pub struct AnnouncementService {
    announcement_repo: Arc<AnnouncementRepository>,
    bid_repo: Arc<BidRepository>,
    delivery_repo: Arc<DeliveryRepository>,
    user_repo: Arc<UserRepository>,
    reminders: Arc<ReminderWriter>,
    rbac: RbacEnforcer,
    config: MarketplaceConfig,
}

impl AnnouncementService {
    /// Creates a new announcement service.
    pub fn new(
        announcement_repo: Arc<AnnouncementRepository>,
        bid_repo: Arc<BidRepository>,
        delivery_repo: Arc<DeliveryRepository>,
        user_repo: Arc<UserRepository>,
        reminders: Arc<ReminderWriter>,
        config: MarketplaceConfig,
    ) -> Self {
        Self {
            announcement_repo,
            bid_repo,
            delivery_repo,
            user_repo,
            reminders,
            rbac: RbacEnforcer::new(),
            config,
        }
    }

    /// Gets an announcement by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Announcement> {
        self.announcement_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Announcement {id} not found")))
    }

    /// Lists announcements, optionally filtered by status or restricted to
    /// the caller's own.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<AnnouncementStatus>,
        mine: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Announcement>> {
        let author = mine.then_some(ctx.user_id);
        self.announcement_repo.list(status, author, page).await
    }

    /// Creates a draft announcement.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: AnnouncementInput,
    ) -> AppResult<Announcement> {
        self.rbac.require_poster(ctx.role)?;
        input.validate(self.config.min_price_cents, Utc::now())?;

        let announcement = self
            .announcement_repo
            .create(&CreateAnnouncement {
                author_id: ctx.user_id,
                title: input.title,
                description: input.description,
                kind: input.kind,
                pickup_address: input.pickup_address,
                delivery_address: input.delivery_address,
                pickup_at: input.pickup_at,
                deadline: input.deadline,
                price_cents: input.price_cents,
            })
            .await?;

        info!(announcement_id = %announcement.id, author_id = %ctx.user_id, "Announcement created");
        Ok(announcement)
    }

    /// `draft → active`; schedules the no-match reminders.
    pub async fn publish(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Announcement> {
        let announcement = self.get_owned(ctx, id).await?;
        let now = Utc::now();
        let published = self
            .move_to(
                &announcement,
                AnnouncementStatus::Active,
                AnnouncementPatch::default(),
                Some(ctx.user_id),
                "publish",
            )
            .await?;

        self.reminders
            .schedule_reminders_for(&ReminderEvent::announcement_published(&published, now), now)
            .await;
        self.announce_to_deliverers(&published, now).await;
        Ok(published)
    }

    /// A validated deliverer bids on an active announcement.
    pub async fn place_bid(
        &self,
        ctx: &RequestContext,
        announcement_id: Uuid,
        price_cents: i64,
        message: Option<String>,
    ) -> AppResult<Bid> {
        self.rbac.require_any_role(ctx.role, &[UserRole::Deliverer])?;
        self.require_validated(ctx.user_id).await?;

        let announcement = self.get(announcement_id).await?;
        if announcement.status != AnnouncementStatus::Active {
            return Err(AppError::conflict(format!(
                "Announcement is '{}' and does not accept bids",
                announcement.status
            )));
        }
        if price_cents <= 0 {
            return Err(AppError::validation("Bid price must be positive"));
        }

        let bid = self
            .bid_repo
            .create(&CreateBid {
                announcement_id,
                deliverer_id: ctx.user_id,
                price_cents,
                message,
            })
            .await?;

        self.reminders
            .notify_now(&EventNotice::new_bid(&announcement, &bid), Utc::now())
            .await;

        info!(bid_id = %bid.id, %announcement_id, deliverer_id = %ctx.user_id, "Bid placed");
        Ok(bid)
    }

    /// Bids on an announcement: every bid for the author or an admin, only
    /// their own for a deliverer.
    pub async fn list_bids(
        &self,
        ctx: &RequestContext,
        announcement_id: Uuid,
    ) -> AppResult<Vec<Bid>> {
        let announcement = self.get(announcement_id).await?;
        let bids = self.bid_repo.find_by_announcement(announcement_id).await?;
        if announcement.is_owned_by(ctx.user_id) || ctx.is_admin() {
            Ok(bids)
        } else {
            Ok(bids
                .into_iter()
                .filter(|b| b.deliverer_id == ctx.user_id)
                .collect())
        }
    }

    /// The author accepts a bid: `active → matched` with a match expiry.
    pub async fn accept_bid(&self, ctx: &RequestContext, bid_id: Uuid) -> AppResult<Announcement> {
        let bid = self
            .bid_repo
            .find_by_id(bid_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Bid {bid_id} not found")))?;
        let announcement = self.get_owned(ctx, bid.announcement_id).await?;
        if bid.status != BidStatus::Pending {
            return Err(AppError::invalid_transition("bid", bid.status, BidStatus::Accepted));
        }

        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.match_ttl_hours);
        let matched = self
            .move_to(
                &announcement,
                AnnouncementStatus::Matched,
                AnnouncementPatch {
                    deliverer_id: Some(Some(bid.deliverer_id)),
                    match_expires_at: Some(Some(expires_at)),
                },
                Some(ctx.user_id),
                "match",
            )
            .await?;

        if self
            .bid_repo
            .transition(bid.id, BidStatus::Pending, BidStatus::Accepted)
            .await?
            .is_none()
        {
            // The bid was withdrawn meanwhile: put the announcement back.
            self.move_to(
                &matched,
                AnnouncementStatus::Active,
                AnnouncementPatch {
                    deliverer_id: Some(None),
                    match_expires_at: Some(None),
                },
                Some(ctx.user_id),
                "unmatch",
            )
            .await?;
            return Err(AppError::conflict("Bid is no longer pending"));
        }

        let rejected = self.bid_repo.reject_others(matched.id, bid.id).await?;
        self.reminders
            .cancel_for_entity(
                matched.id,
                Some(&[
                    NotificationKind::AnnouncementUnmatched,
                    NotificationKind::NewAnnouncement,
                ]),
                now,
            )
            .await?;
        self.reminders
            .notify_now(&EventNotice::bid_accepted(&matched, bid.deliverer_id), now)
            .await;
        self.reminders
            .schedule_reminders_for(
                &ReminderEvent::match_expiring(&matched, bid.deliverer_id, expires_at),
                now,
            )
            .await;

        info!(announcement_id = %matched.id, %bid_id, rejected, "Bid accepted");
        Ok(matched)
    }

    /// The bidder withdraws a pending bid.
    pub async fn withdraw_bid(&self, ctx: &RequestContext, bid_id: Uuid) -> AppResult<Bid> {
        let bid = self
            .bid_repo
            .find_by_id(bid_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Bid {bid_id} not found")))?;
        if bid.deliverer_id != ctx.user_id {
            return Err(AppError::authorization("Only the bidder can withdraw a bid"));
        }
        if !bid.status.can_transition_to(BidStatus::Withdrawn) {
            return Err(AppError::invalid_transition("bid", bid.status, BidStatus::Withdrawn));
        }

        self.bid_repo
            .transition(bid.id, BidStatus::Pending, BidStatus::Withdrawn)
            .await?
            .ok_or_else(|| AppError::invalid_transition("bid", bid.status, BidStatus::Withdrawn))
    }

    /// The matched deliverer confirms: `matched → assigned`, the delivery
    /// is created and pickup reminders are scheduled.
    pub async fn assign(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Delivery> {
        let announcement = self.get(id).await?;
        let deliverer_id = self.require_deliverer(ctx, &announcement)?;
        let now = Utc::now();

        let assigned = self
            .move_to(
                &announcement,
                AnnouncementStatus::Assigned,
                AnnouncementPatch {
                    deliverer_id: None,
                    match_expires_at: Some(None),
                },
                Some(ctx.user_id),
                "assign",
            )
            .await?;

        self.reminders
            .cancel_for_entity(assigned.id, Some(&[NotificationKind::MatchExpiring]), now)
            .await?;

        let delivery = self
            .delivery_repo
            .create(
                assigned.id,
                deliverer_id,
                assigned.author_id,
                assigned.pickup_at,
                &validation_code(Uuid::new_v4()),
            )
            .await?;

        self.reminders
            .schedule_reminders_for(
                &ReminderEvent::delivery_scheduled(&delivery, &assigned.title),
                now,
            )
            .await;

        info!(announcement_id = %assigned.id, delivery_id = %delivery.id, "Announcement assigned");
        redact_for(ctx, delivery)
    }

    /// The deliverer picked the parcel up: `assigned → in_progress`.
    pub async fn start(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Announcement> {
        let announcement = self.get(id).await?;
        self.require_deliverer(ctx, &announcement)?;

        let started = self
            .move_to(
                &announcement,
                AnnouncementStatus::InProgress,
                AnnouncementPatch::default(),
                Some(ctx.user_id),
                "start",
            )
            .await?;

        let delivery = self.delivery_for(id).await?;
        self.advance_delivery(&delivery, DeliveryStatus::PickedUp, ctx.user_id)
            .await?;
        let now = Utc::now();
        self.reminders
            .cancel_for_entity(delivery.id, Some(&[NotificationKind::PickupReminder]), now)
            .await?;
        self.reminders
            .notify_now(&EventNotice::delivery_started(&started), now)
            .await;
        Ok(started)
    }

    /// The deliverer dropped the parcel off: `in_progress → delivered`.
    pub async fn deliver(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Announcement> {
        let announcement = self.get(id).await?;
        self.require_deliverer(ctx, &announcement)?;
        let now = Utc::now();

        let delivered = self
            .move_to(
                &announcement,
                AnnouncementStatus::Delivered,
                AnnouncementPatch::default(),
                Some(ctx.user_id),
                "deliver",
            )
            .await?;

        let mut delivery = self.delivery_for(id).await?;
        if delivery.status == DeliveryStatus::PickedUp {
            delivery = self
                .advance_delivery(&delivery, DeliveryStatus::InTransit, ctx.user_id)
                .await?;
        }
        let delivery = self
            .advance_delivery(&delivery, DeliveryStatus::Delivered, ctx.user_id)
            .await?;

        self.reminders
            .schedule_reminders_for(
                &ReminderEvent::delivery_delivered(&delivery, now, &delivered.title),
                now,
            )
            .await;
        self.reminders
            .notify_now(&EventNotice::delivery_completed(&delivered), now)
            .await;
        Ok(delivered)
    }

    /// The client confirms reception with the validation code:
    /// `delivered → validated`.
    pub async fn validate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        code: &str,
    ) -> AppResult<Announcement> {
        let announcement = self.get_owned(ctx, id).await?;
        let delivery = self.delivery_for(id).await?;
        let now = Utc::now();
        if delivery.validation_code != code.trim() {
            return Err(AppError::validation("Invalid validation code"));
        }

        let validated = self
            .move_to(
                &announcement,
                AnnouncementStatus::Validated,
                AnnouncementPatch::default(),
                Some(ctx.user_id),
                "validate",
            )
            .await?;

        self.advance_delivery(&delivery, DeliveryStatus::Confirmed, ctx.user_id)
            .await?;
        self.reminders
            .cancel_for_entity(
                delivery.id,
                Some(&[NotificationKind::DeliveryValidation]),
                now,
            )
            .await?;
        self.reminders
            .notify_now(
                &EventNotice::delivery_confirmed(&validated, delivery.deliverer_id),
                now,
            )
            .await;
        Ok(validated)
    }

    /// `validated → completed`, once the deliverer has been paid out.
    pub async fn complete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Announcement> {
        let announcement = self.get_owned(ctx, id).await?;
        self.move_to(
            &announcement,
            AnnouncementStatus::Completed,
            AnnouncementPatch::default(),
            Some(ctx.user_id),
            "complete",
        )
        .await
    }

    /// Cancels an announcement and every pending reminder attached to it or
    /// to its delivery.
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        reason: Option<String>,
    ) -> AppResult<CancelOutcome> {
        let announcement = self.get_owned(ctx, id).await?;
        let refund_required = announcement.status.requires_refund_on_cancel();
        let now = Utc::now();

        let cancelled = self
            .move_to_with_details(
                &announcement,
                AnnouncementStatus::Cancelled,
                AnnouncementPatch::default(),
                Some(ctx.user_id),
                "cancel",
                reason.map(|r| {
                    serde_json::json!({ "reason": r, "refund_required": refund_required })
                }),
            )
            .await?;

        let mut reminders_cancelled = self.reminders.cancel_for_entity(id, None, now).await?;
        self.bid_repo.reject_others(id, Uuid::nil()).await?;

        if let Some(delivery) = self.delivery_repo.find_by_announcement(id).await? {
            if delivery.status.can_transition_to(DeliveryStatus::Cancelled) {
                self.advance_delivery(&delivery, DeliveryStatus::Cancelled, ctx.user_id)
                    .await?;
            }
            reminders_cancelled += self
                .reminders
                .cancel_for_entity(delivery.id, None, now)
                .await?;
        }
        if let Some(notice) = notice_on_cancel(&cancelled, announcement.status) {
            self.reminders.notify_now(&notice, now).await;
        }

        info!(
            announcement_id = %id,
            from = %announcement.status,
            refund_required,
            reminders_cancelled,
            "Announcement cancelled"
        );
        Ok(CancelOutcome {
            announcement: cancelled,
            refund_required,
            reminders_cancelled,
        })
    }

    /// Maintenance: expire active announcements past their deadline.
    pub async fn expire_overdue(&self, now: DateTime<Utc>, limit: i64) -> AppResult<usize> {
        let overdue = self.announcement_repo.find_expired_active(now, limit).await?;
        let mut expired = 0;
        for announcement in &overdue {
            match self
                .move_to(
                    announcement,
                    AnnouncementStatus::Expired,
                    AnnouncementPatch::default(),
                    None,
                    "expire",
                )
                .await
            {
                Ok(_) => {
                    self.reminders
                        .cancel_for_entity(announcement.id, None, now)
                        .await?;
                    self.bid_repo.reject_others(announcement.id, Uuid::nil()).await?;
                    expired += 1;
                }
                Err(e) if e.is_client_error() => {
                    warn!(announcement_id = %announcement.id, error = %e, "Skipped expiry");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(expired)
    }

    /// Maintenance: matches whose deliverer never confirmed go back on the
    /// market.
    pub async fn release_lapsed_matches(&self, now: DateTime<Utc>, limit: i64) -> AppResult<usize> {
        let lapsed = self.announcement_repo.find_lapsed_matches(now, limit).await?;
        let mut released = 0;
        for announcement in &lapsed {
            match self
                .move_to(
                    announcement,
                    AnnouncementStatus::Active,
                    AnnouncementPatch {
                        deliverer_id: Some(None),
                        match_expires_at: Some(None),
                    },
                    None,
                    "match_lapsed",
                )
                .await
            {
                Ok(_) => {
                    self.bid_repo.reject_accepted(announcement.id).await?;
                    self.reminders
                        .cancel_for_entity(
                            announcement.id,
                            Some(&[NotificationKind::MatchExpiring]),
                            now,
                        )
                        .await?;
                    released += 1;
                }
                Err(e) if e.is_client_error() => {
                    warn!(announcement_id = %announcement.id, error = %e, "Skipped lapsed match");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(released)
    }

    async fn announce_to_deliverers(&self, announcement: &Announcement, now: DateTime<Utc>) {
        let deliverers = match self
            .user_repo
            .find_approved_ids(UserRole::Deliverer, self.config.announcement_fanout)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!(announcement_id = %announcement.id, error = %e, "Could not list deliverers");
                return;
            }
        };
        if deliverers.is_empty() {
            return;
        }
        self.reminders
            .notify_now(&EventNotice::new_announcement(announcement, deliverers), now)
            .await;
    }

    async fn get_owned(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Announcement> {
        let announcement = self.get(id).await?;
        if !announcement.is_owned_by(ctx.user_id) && !ctx.is_admin() {
            return Err(AppError::authorization(
                "Only the author can manage this announcement",
            ));
        }
        Ok(announcement)
    }

    fn require_deliverer(
        &self,
        ctx: &RequestContext,
        announcement: &Announcement,
    ) -> AppResult<Uuid> {
        match announcement.deliverer_id {
            Some(deliverer_id) if deliverer_id == ctx.user_id || ctx.is_admin() => Ok(deliverer_id),
            Some(_) => Err(AppError::authorization(
                "Only the matched deliverer can perform this action",
            )),
            None => Err(AppError::conflict("Announcement has no deliverer")),
        }
    }

    async fn require_validated(&self, user_id: Uuid) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;
        if user.is_validated() {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Account must be validated by an administrator first",
            ))
        }
    }

    async fn delivery_for(&self, announcement_id: Uuid) -> AppResult<Delivery> {
        self.delivery_repo
            .find_by_announcement(announcement_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("No delivery for announcement {announcement_id}"))
            })
    }

    async fn advance_delivery(
        &self,
        delivery: &Delivery,
        to: DeliveryStatus,
        actor: Uuid,
    ) -> AppResult<Delivery> {
        super::delivery::transition_delivery(&self.delivery_repo, delivery, to, Some(actor)).await
    }

    async fn move_to(
        &self,
        announcement: &Announcement,
        to: AnnouncementStatus,
        patch: AnnouncementPatch,
        actor: Option<Uuid>,
        action: &str,
    ) -> AppResult<Announcement> {
        self.move_to_with_details(announcement, to, patch, actor, action, None)
            .await
    }

    async fn move_to_with_details(
        &self,
        announcement: &Announcement,
        to: AnnouncementStatus,
        patch: AnnouncementPatch,
        actor: Option<Uuid>,
        action: &str,
        details: Option<serde_json::Value>,
    ) -> AppResult<Announcement> {
        let from = announcement.status;
        if !from.can_transition_to(to) {
            return Err(AppError::invalid_transition("announcement", from, to));
        }

        let mut audit = CreateAuditLogEntry::transition(
            actor,
            "announcement",
            announcement.id,
            action,
            from,
            to,
        );
        if let Some(details) = details {
            audit = audit.with_details(details);
        }

        let updated = self
            .announcement_repo
            .transition(announcement.id, from, to, patch, &audit)
            .await?
            .ok_or_else(|| AppError::invalid_transition("announcement", from, to))?;

        info!(announcement_id = %announcement.id, %from, %to, "Announcement status changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(now: DateTime<Utc>) -> AnnouncementInput {
        AnnouncementInput {
            title: "Box of books".into(),
            description: "Two boxes".into(),
            kind: AnnouncementKind::PackageDelivery,
            pickup_address: "1 rue de Paris".into(),
            delivery_address: "2 avenue de Lyon".into(),
            pickup_at: now + Duration::hours(5),
            deadline: now + Duration::days(2),
            price_cents: 1500,
        }
    }

    #[test]
    fn test_valid_input() {
        let now = Utc::now();
        assert!(input(now).validate(100, now).is_ok());
    }

    #[test]
    fn test_price_floor() {
        let now = Utc::now();
        let mut cheap = input(now);
        cheap.price_cents = 50;
        assert!(cheap.validate(100, now).is_err());
    }

    #[test]
    fn test_deadline_rules() {
        let now = Utc::now();
        let mut past = input(now);
        past.deadline = now;
        assert!(past.validate(100, now).is_err());

        let mut late_pickup = input(now);
        late_pickup.pickup_at = late_pickup.deadline + Duration::minutes(1);
        assert!(late_pickup.validate(100, now).is_err());
    }

    #[test]
    fn test_validation_code_is_six_digits() {
        for _ in 0..20 {
            let code = validation_code(Uuid::new_v4());
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(validation_code(Uuid::nil()), "000000");
    }

    fn announcement(deliverer_id: Option<Uuid>) -> Announcement {
        let now = Utc::now();
        let input = input(now);
        Announcement {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            kind: input.kind,
            pickup_address: input.pickup_address,
            delivery_address: input.delivery_address,
            pickup_at: input.pickup_at,
            deadline: input.deadline,
            price_cents: input.price_cents,
            status: AnnouncementStatus::Cancelled,
            deliverer_id,
            match_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cancel_notifies_the_deliverer_on_the_job() {
        let deliverer = Uuid::new_v4();
        let cancelled = announcement(Some(deliverer));
        for from in [
            AnnouncementStatus::Matched,
            AnnouncementStatus::Assigned,
            AnnouncementStatus::InProgress,
        ] {
            let notice = notice_on_cancel(&cancelled, from).expect("notice");
            assert_eq!(notice.kind, NotificationKind::AnnouncementCancelled);
            assert_eq!(notice.recipients, vec![deliverer]);
            assert_eq!(notice.entity_id, Some(cancelled.id));
        }
    }

    #[test]
    fn test_cancel_before_matching_notifies_nobody() {
        assert!(notice_on_cancel(&announcement(None), AnnouncementStatus::Active).is_none());
        assert!(notice_on_cancel(&announcement(None), AnnouncementStatus::Draft).is_none());
        let stale = announcement(Some(Uuid::new_v4()));
        assert!(notice_on_cancel(&stale, AnnouncementStatus::Active).is_none());
    }
}
