//! Admin platform health.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use ecodeli_auth::RbacEnforcer;
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_database::ScheduledNotificationStore;
use ecodeli_database::repositories::{AuditLogRepository, StatsRepository};
use ecodeli_entity::audit::AuditLogEntry;

use crate::context::RequestContext;

/// Entity kinds whose status transitions are audited.
pub const AUDIT_TARGETS: [&str; 5] = ["announcement", "booking", "delivery", "payment", "user"];

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    /// Role → validation status → count.
    pub users: BTreeMap<String, BTreeMap<String, i64>>,
    /// Announcement status → count.
    pub announcements: BTreeMap<String, i64>,
    /// Scheduled-notification status → count.
    pub notifications: BTreeMap<String, i64>,
    /// Completed payments, in cents.
    pub payments_completed_cents: i64,
    /// Refunded payments, in cents.
    pub payments_refunded_cents: i64,
    pub generated_at: DateTime<Utc>,
}

/// Aggregates platform counters and exposes the audit trail.
#[derive(Debug, Clone)]
pub struct StatsService {
    stats_repo: Arc<StatsRepository>,
    audit_repo: Arc<AuditLogRepository>,
    store: Arc<dyn ScheduledNotificationStore>,
    rbac: RbacEnforcer,
}

impl StatsService {
    /// Creates a new stats service.
    pub fn new(
        stats_repo: Arc<StatsRepository>,
        audit_repo: Arc<AuditLogRepository>,
        store: Arc<dyn ScheduledNotificationStore>,
    ) -> Self {
        Self {
            stats_repo,
            audit_repo,
            store,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Admin: status transitions recorded for one entity, newest first.
    pub async fn audit_trail(
        &self,
        ctx: &RequestContext,
        target_type: &str,
        target_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.rbac.require_admin(ctx.role)?;
        if !AUDIT_TARGETS.contains(&target_type) {
            return Err(AppError::validation(format!(
                "Unknown audit target '{target_type}', expected one of: {}",
                AUDIT_TARGETS.join(", ")
            )));
        }
        self.audit_repo
            .find_by_target(target_type, target_id, page)
            .await
    }

    /// Admin: current platform counters.
    pub async fn platform_stats(&self, ctx: &RequestContext) -> AppResult<PlatformStats> {
        self.rbac.require_admin(ctx.role)?;

        let mut users: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
        for (role, validation, count) in self.stats_repo.users_by_role().await? {
            users
                .entry(role.to_string())
                .or_default()
                .insert(validation.to_string(), count);
        }

        let announcements = self
            .stats_repo
            .announcements_by_status()
            .await?
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect();

        let notifications = self
            .store
            .count_by_status()
            .await?
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect();

        let (payments_completed_cents, payments_refunded_cents) =
            self.stats_repo.payment_totals().await?;

        Ok(PlatformStats {
            users,
            announcements,
            notifications,
            payments_completed_cents,
            payments_refunded_cents,
            generated_at: Utc::now(),
        })
    }
}
