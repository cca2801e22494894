//! In-memory collaborators for scheduler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use ecodeli_channel::Recipient;
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_database::store::{ClaimRequest, ScheduledNotificationStore};
use ecodeli_database::MemoryScheduledNotificationStore;
use ecodeli_entity::notification::{
    NewScheduledNotification, NotificationKind, NotificationPreference, ScheduledNotification,
    ScheduledStatus,
};

use super::runner::{InboxSink, RecipientDirectory, ResolvedRecipient};

/// Users known to the runner, with default preferences.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Arc<Mutex<HashMap<Uuid, ResolvedRecipient>>>,
}

impl StaticDirectory {
    pub fn add_user(&self, email: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        let resolved = ResolvedRecipient {
            recipient: Recipient {
                user_id,
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                phone: None,
                push_token: None,
            },
            preferences: NotificationPreference::default_for_user(user_id),
        };
        self.users.lock().unwrap().insert(user_id, resolved);
        user_id
    }

    pub fn update(&self, user_id: Uuid, apply: impl FnOnce(&mut NotificationPreference)) {
        let mut users = self.users.lock().unwrap();
        let entry = users.get_mut(&user_id).unwrap();
        apply(&mut entry.preferences);
        entry.recipient.phone = entry.preferences.phone.clone();
        entry.recipient.push_token = entry.preferences.push_token.clone();
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn resolve(&self, user_id: Uuid) -> AppResult<Option<ResolvedRecipient>> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}

/// Records the scheduled IDs that reached the inbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryInbox {
    rows: Arc<Mutex<Vec<Uuid>>>,
}

impl MemoryInbox {
    pub fn recorded(&self) -> Vec<Uuid> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl InboxSink for MemoryInbox {
    async fn record(&self, row: &ScheduledNotification) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains(&row.id) {
            rows.push(row.id);
        }
        Ok(())
    }
}

/// Wraps the memory store and fails selected writes.
#[derive(Debug, Clone)]
pub struct FlakyStore {
    inner: MemoryScheduledNotificationStore,
    insert_marker: Option<String>,
    broken_row: Option<Uuid>,
}

impl FlakyStore {
    /// Inserts whose message contains `marker` fail.
    pub fn failing_inserts_containing(
        inner: MemoryScheduledNotificationStore,
        marker: &str,
    ) -> Self {
        Self {
            inner,
            insert_marker: Some(marker.to_string()),
            broken_row: None,
        }
    }

    /// `mark_sent` fails for one row.
    pub fn failing_mark_sent_for(inner: MemoryScheduledNotificationStore, id: Uuid) -> Self {
        Self {
            inner,
            insert_marker: None,
            broken_row: Some(id),
        }
    }
}

#[async_trait]
impl ScheduledNotificationStore for FlakyStore {
    async fn insert(&self, new: &NewScheduledNotification) -> AppResult<ScheduledNotification> {
        if self
            .insert_marker
            .as_deref()
            .is_some_and(|marker| new.message.contains(marker))
        {
            return Err(AppError::database("connection reset"));
        }
        self.inner.insert(new).await
    }

    async fn claim_due(&self, request: &ClaimRequest<'_>) -> AppResult<Vec<ScheduledNotification>> {
        self.inner.claim_due(request).await
    }

    async fn renew_claim(
        &self,
        id: Uuid,
        runner_id: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> AppResult<bool> {
        self.inner.renew_claim(id, runner_id, now, lease).await
    }

    async fn mark_sent(&self, id: Uuid, runner_id: &str, now: DateTime<Utc>) -> AppResult<bool> {
        if self.broken_row == Some(id) {
            return Err(AppError::database("connection reset"));
        }
        self.inner.mark_sent(id, runner_id, now).await
    }

    async fn reschedule(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        next_attempt_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<bool> {
        self.inner
            .reschedule(id, runner_id, retry_count, next_attempt_at, error)
            .await
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        runner_id: &str,
        retry_count: i32,
        error: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.inner
            .mark_failed(id, runner_id, retry_count, error, now)
            .await
    }

    async fn release(&self, id: Uuid, runner_id: &str) -> AppResult<bool> {
        self.inner.release(id, runner_id).await
    }

    async fn cancel_for_entity(
        &self,
        entity_id: Uuid,
        kinds: Option<&[NotificationKind]>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.inner.cancel_for_entity(entity_id, kinds, now).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ScheduledNotification>> {
        self.inner.find_by_id(id).await
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<ScheduledStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScheduledNotification>> {
        self.inner.list_for_recipient(recipient_id, status, page).await
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ScheduledStatus, i64)>> {
        self.inner.count_by_status().await
    }
}
