//! In-process scheduled-notification store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_entity::notification::{
    NewScheduledNotification, NotificationKind, ScheduledNotification, ScheduledStatus,
};

use super::{ClaimRequest, ScheduledNotificationStore};

/// Scheduled notifications kept in a mutex-guarded map.
///
/// A single lock covers every operation, which gives claims the same
/// all-or-nothing behavior as `FOR UPDATE SKIP LOCKED`.
#[derive(Debug, Clone, Default)]
pub struct MemoryScheduledNotificationStore {
    rows: Arc<Mutex<HashMap<Uuid, ScheduledNotification>>>,
}

impl MemoryScheduledNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed row, whatever its status.
    pub async fn put(&self, row: ScheduledNotification) {
        self.rows.lock().await.insert(row.id, row);
    }

    /// All rows, ordered by `scheduled_for`.
    pub async fn snapshot(&self) -> Vec<ScheduledNotification> {
        let mut rows: Vec<_> = self.rows.lock().await.values().cloned().collect();
        rows.sort_by_key(|row| row.scheduled_for);
        rows
    }

    async fn update_claimed<F>(&self, id: Uuid, runner_id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut ScheduledNotification) -> bool,
    {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(row)
                if row.status == ScheduledStatus::Pending
                    && row.claimed_by.as_deref() == Some(runner_id) =>
            {
                if !apply(row) {
                    return false;
                }
                row.claimed_by = None;
                row.claimed_until = None;
                row.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ScheduledNotificationStore for MemoryScheduledNotificationStore {
    async fn insert(&self, new: &NewScheduledNotification) -> AppResult<ScheduledNotification> {
        let row = ScheduledNotification::from_new(new.clone(), Utc::now());
        self.rows.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn claim_due(&self, request: &ClaimRequest<'_>) -> AppResult<Vec<ScheduledNotification>> {
        let mut rows = self.rows.lock().await;
        let mut due: Vec<&mut ScheduledNotification> = rows
            .values_mut()
            .filter(|row| row.is_due(request.now) && !row.is_claimed(request.now))
            .collect();
        due.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.scheduled_for.cmp(&b.scheduled_for))
        });

        let limit = usize::try_from(request.limit).unwrap_or(0);
        let claimed_until = request.now + request.lease;
        Ok(due
            .into_iter()
            .take(limit)
            .map(|row| {
                row.claimed_by = Some(request.runner_id.to_string());
                row.claimed_until = Some(claimed_until);
                row.clone()
            })
            .collect())
    }

    async fn renew_claim(
        &self,
        id: Uuid,
        runner_id: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> AppResult<bool> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(row)
                if row.status == ScheduledStatus::Pending
                    && row.claimed_by.as_deref() == Some(runner_id) =>
            {
                row.claimed_until = Some(now + lease);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_sent(&self, id: Uuid, runner_id: &str, now: DateTime<Utc>) -> AppResult<bool> {
        Ok(self
            .update_claimed(id, runner_id, |row| {
                row.status = ScheduledStatus::Sent;
                row.sent_at = Some(now);
                true
            })
            .await)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        next_attempt_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<bool> {
        Ok(self
            .update_claimed(id, runner_id, |row| {
                if retry_count >= row.max_retries {
                    return false;
                }
                row.retry_count = retry_count;
                row.scheduled_for = next_attempt_at;
                row.last_error = Some(error.to_string());
                true
            })
            .await)
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        error: &str,
        _now: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self
            .update_claimed(id, runner_id, |row| {
                row.status = ScheduledStatus::Failed;
                row.retry_count = retry_count.min(row.max_retries);
                row.last_error = Some(error.to_string());
                true
            })
            .await)
    }

    async fn release(&self, id: Uuid, runner_id: &str) -> AppResult<bool> {
        Ok(self.update_claimed(id, runner_id, |_| true).await)
    }

    async fn cancel_for_entity(
        &self,
        entity_id: Uuid,
        kinds: Option<&[NotificationKind]>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut cancelled = 0;
        for row in rows.values_mut() {
            let kind_matches = kinds.is_none_or(|kinds| kinds.contains(&row.kind));
            if row.entity_id == Some(entity_id)
                && row.status == ScheduledStatus::Pending
                && kind_matches
            {
                row.status = ScheduledStatus::Cancelled;
                row.claimed_by = None;
                row.claimed_until = None;
                row.updated_at = now;
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ScheduledNotification>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<ScheduledStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScheduledNotification>> {
        let rows = self.rows.lock().await;
        let mut matching: Vec<_> = rows
            .values()
            .filter(|row| row.recipient_id == recipient_id)
            .filter(|row| status.is_none_or(|s| row.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.scheduled_for.cmp(&a.scheduled_for));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::from_request(items, page, total))
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ScheduledStatus, i64)>> {
        let rows = self.rows.lock().await;
        Ok(ScheduledStatus::ALL
            .into_iter()
            .map(|status| {
                let count = rows.values().filter(|row| row.status == status).count() as i64;
                (status, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect())
    }
}
