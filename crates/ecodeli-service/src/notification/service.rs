//! Inbox, preferences and scheduled-notification management.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_core::types::pagination::{PageRequest, PageResponse};
use ecodeli_database::ScheduledNotificationStore;
use ecodeli_database::repositories::{InboxRepository, PreferenceRepository};
use ecodeli_entity::notification::{
    InboxNotification, NotificationPreference, ScheduledNotification, ScheduledStatus,
};

use super::runner::{NotificationRunner, ProcessReport};
use super::writer::ReminderWriter;
use crate::context::RequestContext;

/// Partial preference update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceUpdate {
    /// Deliver by email.
    pub email_enabled: Option<bool>,
    /// Deliver by push.
    pub push_enabled: Option<bool>,
    /// Deliver by SMS.
    pub sms_enabled: Option<bool>,
    /// Phone number for SMS.
    pub phone: Option<String>,
    /// Device token for push.
    pub push_token: Option<String>,
}

impl PreferenceUpdate {
    /// Apply the update and check that enabled channels stay reachable.
    pub fn apply_to(
        self,
        mut current: NotificationPreference,
    ) -> AppResult<NotificationPreference> {
        if let Some(v) = self.email_enabled {
            current.email_enabled = v;
        }
        if let Some(v) = self.push_enabled {
            current.push_enabled = v;
        }
        if let Some(v) = self.sms_enabled {
            current.sms_enabled = v;
        }
        if let Some(phone) = self.phone {
            current.phone = Some(phone.trim().to_string()).filter(|p| !p.is_empty());
        }
        if let Some(token) = self.push_token {
            current.push_token = Some(token.trim().to_string()).filter(|t| !t.is_empty());
        }

        if current.sms_enabled && current.phone.is_none() {
            return Err(AppError::validation("SMS notifications require a phone number"));
        }
        Ok(current)
    }
}

/// Manages the in-app inbox, channel preferences and scheduled rows.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn ScheduledNotificationStore>,
    inbox_repo: Arc<InboxRepository>,
    preference_repo: Arc<PreferenceRepository>,
    writer: Arc<ReminderWriter>,
    runner: Arc<NotificationRunner>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        store: Arc<dyn ScheduledNotificationStore>,
        inbox_repo: Arc<InboxRepository>,
        preference_repo: Arc<PreferenceRepository>,
        writer: Arc<ReminderWriter>,
        runner: Arc<NotificationRunner>,
    ) -> Self {
        Self {
            store,
            inbox_repo,
            preference_repo,
            writer,
            runner,
        }
    }

    /// Lists inbox notifications for the current user.
    pub async fn list_inbox(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<InboxNotification>> {
        self.inbox_repo.find_by_user(ctx.user_id, unread_only, page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.inbox_repo.count_unread(ctx.user_id).await
    }

    /// Marks a notification as read.
    pub async fn mark_read(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        if self.inbox_repo.mark_read(notification_id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )))
        }
    }

    /// Acknowledges a notification that asks for confirmation.
    pub async fn confirm(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        if self.inbox_repo.confirm(notification_id, ctx.user_id).await? {
            info!(user_id = %ctx.user_id, %notification_id, "Notification confirmed");
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "No confirmable notification {notification_id}"
            )))
        }
    }

    /// Removes a notification from the caller's inbox.
    pub async fn delete(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        if self.inbox_repo.delete(notification_id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )))
        }
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.inbox_repo.mark_all_read(ctx.user_id).await
    }

    /// Gets the user's notification preferences.
    pub async fn get_preferences(&self, ctx: &RequestContext) -> AppResult<NotificationPreference> {
        self.preference_repo.find_or_default(ctx.user_id).await
    }

    /// Updates the user's notification preferences.
    pub async fn update_preferences(
        &self,
        ctx: &RequestContext,
        update: PreferenceUpdate,
    ) -> AppResult<NotificationPreference> {
        let current = self.preference_repo.find_or_default(ctx.user_id).await?;
        let updated = update.apply_to(current)?;
        self.preference_repo.upsert(&updated).await
    }

    /// Scheduled rows addressed to the current user.
    pub async fn list_scheduled(
        &self,
        ctx: &RequestContext,
        status: Option<ScheduledStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScheduledNotification>> {
        self.store.list_for_recipient(ctx.user_id, status, page).await
    }

    /// Admin: run the scheduler runner now.
    pub async fn process_due(&self, ctx: &RequestContext) -> AppResult<ProcessReport> {
        let report = self.runner.process_due(Utc::now()).await?;
        info!(admin_id = %ctx.user_id, sent = report.sent, "Manual notification run");
        Ok(report)
    }

    /// Admin: cancel every pending reminder of an entity.
    pub async fn cancel_for_entity(&self, ctx: &RequestContext, entity_id: Uuid) -> AppResult<u64> {
        let cancelled = self
            .writer
            .cancel_for_entity(entity_id, None, Utc::now())
            .await?;
        info!(admin_id = %ctx.user_id, %entity_id, cancelled, "Reminders cancelled by admin");
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let user = Uuid::new_v4();
        let prefs = NotificationPreference::default_for_user(user);
        let updated = PreferenceUpdate {
            push_enabled: Some(false),
            ..PreferenceUpdate::default()
        }
        .apply_to(prefs)
        .unwrap();
        assert!(!updated.push_enabled);
        assert!(updated.email_enabled);
        assert!(!updated.sms_enabled);
    }

    #[test]
    fn test_sms_requires_phone() {
        let prefs = NotificationPreference::default_for_user(Uuid::new_v4());
        let err = PreferenceUpdate {
            sms_enabled: Some(true),
            ..PreferenceUpdate::default()
        }
        .apply_to(prefs.clone())
        .unwrap_err();
        assert_eq!(err.kind, ecodeli_core::error::ErrorKind::Validation);

        let ok = PreferenceUpdate {
            sms_enabled: Some(true),
            phone: Some(" +33611223344 ".into()),
            ..PreferenceUpdate::default()
        }
        .apply_to(prefs)
        .unwrap();
        assert_eq!(ok.phone.as_deref(), Some("+33611223344"));
    }
}
