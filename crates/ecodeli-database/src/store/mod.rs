//! Storage for scheduled notifications.
//!
//! The scheduler writer and runner talk to a [`ScheduledNotificationStore`]
//! rather than to Postgres directly. [`PgScheduledNotificationStore`] is the
//! production backend; [`MemoryScheduledNotificationStore`] mirrors its
//! semantics in-process for tests and database-less tooling.
//!
//! Every mutation is conditional on `status = 'pending'`, so sent, failed
//! and cancelled rows are never touched again. Outcome writes are further
//! conditional on the claim holder, so a row claimed by one runner cannot
//! be completed by another.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::notification::{
    NewScheduledNotification, NotificationKind, ScheduledNotification, ScheduledStatus,
};

pub use memory::MemoryScheduledNotificationStore;
pub use postgres::PgScheduledNotificationStore;

/// Parameters of a claim on due rows.
#[derive(Debug, Clone)]
pub struct ClaimRequest<'a> {
    /// Identifier of the claiming runner.
    pub runner_id: &'a str,
    /// Reference time; only rows scheduled at or before it are claimed.
    pub now: DateTime<Utc>,
    /// How long the claimed rows stay reserved.
    pub lease: Duration,
    /// Maximum number of rows returned.
    pub limit: i64,
}

/// Persistence operations of the notification scheduler.
#[async_trait]
pub trait ScheduledNotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new pending row.
    async fn insert(&self, new: &NewScheduledNotification) -> AppResult<ScheduledNotification>;

    /// Atomically reserve due rows for one runner.
    ///
    /// Returns pending rows with `scheduled_for <= now` and no live claim,
    /// ordered by priority (highest first), then by `scheduled_for`.
    async fn claim_due(&self, request: &ClaimRequest<'_>) -> AppResult<Vec<ScheduledNotification>>;

    /// Extend a live claim to `now + lease` before working on the row.
    /// Returns `false` if the row is no longer pending or another runner
    /// took it over.
    async fn renew_claim(
        &self,
        id: Uuid,
        runner_id: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> AppResult<bool>;

    /// Mark a claimed row as sent. Returns `false` if the row is no longer
    /// pending or is held by another runner.
    async fn mark_sent(&self, id: Uuid, runner_id: &str, now: DateTime<Utc>) -> AppResult<bool>;

    /// Record a failed attempt and put the row back in the queue.
    async fn reschedule(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        next_attempt_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<bool>;

    /// Record the last failed attempt and mark the row failed.
    async fn mark_failed(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        error: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Drop a claim without recording an attempt (the runner could not
    /// evaluate the row).
    async fn release(&self, id: Uuid, runner_id: &str) -> AppResult<bool>;

    /// Cancel every pending row for an entity, optionally restricted to some
    /// kinds. Returns the number of rows cancelled.
    async fn cancel_for_entity(
        &self,
        entity_id: Uuid,
        kinds: Option<&[NotificationKind]>,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Find a row by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ScheduledNotification>>;

    /// List rows for a recipient, most recently scheduled first.
    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<ScheduledStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScheduledNotification>>;

    /// Count rows per status.
    async fn count_by_status(&self) -> AppResult<Vec<(ScheduledStatus, i64)>>;
}
