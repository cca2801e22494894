//! Scheduler writer: turns a domain event into pending notification rows.
//!
//! Reminders land at `anchor + offset` and only when that is still ahead.
//! Event notices land at the moment of the event and the runner picks them
//! up on its next pass.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ecodeli_core::config::NotificationConfig;
use ecodeli_core::config::notification::ReminderRule;
use ecodeli_core::result::AppResult;
use ecodeli_database::ScheduledNotificationStore;
use ecodeli_entity::notification::{
    NewScheduledNotification, NotificationKind, NotificationPriority,
};

use super::event::{EventNotice, ReminderEvent};

/// Outcome of one `schedule_reminders_for` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleReport {
    /// IDs of the rows inserted.
    pub scheduled: Vec<Uuid>,
    /// Rule/recipient pairs whose time was not strictly after now.
    pub skipped: usize,
    /// Inserts that failed.
    pub failed: usize,
}

/// Expand an event into the rows it should produce at `now`.
///
/// One row per rule and recipient whose `anchor + offset` is strictly after
/// `now`. Returns the rows and the number of pairs skipped.
pub fn plan_reminders(
    event: &ReminderEvent,
    rules: &[ReminderRule],
    now: DateTime<Utc>,
    max_retries: i32,
) -> (Vec<NewScheduledNotification>, usize) {
    let kind = event.trigger.kind();
    let mut planned = Vec::with_capacity(rules.len() * event.recipients.len());
    let mut skipped = 0;

    for rule in rules {
        let scheduled_for = event.anchor + Duration::minutes(rule.offset_minutes);
        if scheduled_for <= now {
            skipped += event.recipients.len();
            continue;
        }

        let priority = rule.priority.parse::<NotificationPriority>().unwrap_or_else(|_| {
            warn!(priority = %rule.priority, %kind, "Unknown reminder priority, using normal");
            NotificationPriority::Normal
        });
        let message = rule.message.replace("{label}", &event.label);

        for recipient_id in &event.recipients {
            planned.push(NewScheduledNotification {
                recipient_id: *recipient_id,
                entity_id: event.entity_id,
                kind,
                scheduled_for,
                message: message.clone(),
                priority,
                max_retries,
            });
        }
    }

    (planned, skipped)
}

/// Rows for an event notice: one per recipient, due at `now`.
pub fn plan_notice(
    notice: &EventNotice,
    now: DateTime<Utc>,
    max_retries: i32,
) -> Vec<NewScheduledNotification> {
    notice
        .recipients
        .iter()
        .map(|recipient_id| NewScheduledNotification {
            recipient_id: *recipient_id,
            entity_id: notice.entity_id,
            kind: notice.kind,
            scheduled_for: now,
            message: notice.message.clone(),
            priority: notice.priority,
            max_retries,
        })
        .collect()
}

/// Inserts reminder rows for domain events.
#[derive(Debug, Clone)]
pub struct ReminderWriter {
    /// Scheduled-notification storage.
    store: Arc<dyn ScheduledNotificationStore>,
    /// Reminder tables and retry cap.
    config: NotificationConfig,
}

impl ReminderWriter {
    /// Creates a new writer.
    pub fn new(store: Arc<dyn ScheduledNotificationStore>, config: NotificationConfig) -> Self {
        Self { store, config }
    }

    /// Schedule every future reminder of `event`.
    ///
    /// Inserts are independent: a failed insert is logged and counted, and
    /// the remaining rows are still written.
    pub async fn schedule_reminders_for(
        &self,
        event: &ReminderEvent,
        now: DateTime<Utc>,
    ) -> ScheduleReport {
        let rules = event.trigger.rules(&self.config.reminders);
        let (planned, skipped) = plan_reminders(event, rules, now, self.config.max_retries);

        let mut report = ScheduleReport {
            skipped,
            ..ScheduleReport::default()
        };
        self.insert_all(&planned, &mut report).await;

        info!(
            trigger = ?event.trigger,
            entity_id = ?event.entity_id,
            scheduled = report.scheduled.len(),
            skipped = report.skipped,
            failed = report.failed,
            "Reminders scheduled"
        );
        report
    }

    /// Queue an event notice for immediate delivery. Insert failures are
    /// logged and counted like reminder inserts.
    pub async fn notify_now(&self, notice: &EventNotice, now: DateTime<Utc>) -> ScheduleReport {
        let planned = plan_notice(notice, now, self.config.max_retries);
        let mut report = ScheduleReport::default();
        self.insert_all(&planned, &mut report).await;

        debug!(
            kind = %notice.kind,
            entity_id = ?notice.entity_id,
            queued = report.scheduled.len(),
            failed = report.failed,
            "Event notice queued"
        );
        report
    }

    async fn insert_all(&self, planned: &[NewScheduledNotification], report: &mut ScheduleReport) {
        for row in planned {
            match self.store.insert(row).await {
                Ok(inserted) => {
                    debug!(
                        id = %inserted.id,
                        kind = %inserted.kind,
                        scheduled_for = %inserted.scheduled_for,
                        "Notification row inserted"
                    );
                    report.scheduled.push(inserted.id);
                }
                Err(e) => {
                    warn!(
                        kind = %row.kind,
                        recipient_id = %row.recipient_id,
                        scheduled_for = %row.scheduled_for,
                        error = %e,
                        "Failed to insert notification row"
                    );
                    report.failed += 1;
                }
            }
        }
    }

    /// Cancel the pending reminders of an entity, optionally only some
    /// kinds. Sent and failed rows are left as they are.
    pub async fn cancel_for_entity(
        &self,
        entity_id: Uuid,
        kinds: Option<&[NotificationKind]>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let cancelled = self.store.cancel_for_entity(entity_id, kinds, now).await?;
        if cancelled > 0 {
            info!(%entity_id, ?kinds, cancelled, "Pending reminders cancelled");
        }
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::event::ReminderTrigger;
    use crate::notification::testing::FlakyStore;
    use ecodeli_database::MemoryScheduledNotificationStore;
    use ecodeli_entity::notification::ScheduledStatus;

    fn event(anchor: DateTime<Utc>, recipients: Vec<Uuid>) -> ReminderEvent {
        ReminderEvent {
            trigger: ReminderTrigger::PaymentPending,
            anchor,
            entity_id: Some(Uuid::new_v4()),
            recipients,
            label: "42.00 EUR".to_string(),
        }
    }

    fn config_with(rules: Vec<ReminderRule>) -> NotificationConfig {
        let mut config = NotificationConfig::default();
        config.reminders.payment_pending = rules;
        config
    }

    #[test]
    fn test_rule_landing_exactly_now_is_excluded() {
        let now = Utc::now();
        let rules = vec![
            ReminderRule::new(0, "at now", "normal"),
            ReminderRule::new(1, "after now", "normal"),
        ];
        let (planned, skipped) = plan_reminders(&event(now, vec![Uuid::new_v4()]), &rules, now, 3);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].message, "after now");
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_past_and_future_mix() {
        let now = Utc::now();
        let anchor = now - Duration::minutes(90);
        let rules = vec![
            ReminderRule::new(60, "past", "normal"),
            ReminderRule::new(24 * 60, "future", "high"),
        ];
        let (planned, skipped) =
            plan_reminders(&event(anchor, vec![Uuid::new_v4()]), &rules, now, 3);
        assert_eq!(skipped, 1);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].scheduled_for, anchor + Duration::minutes(24 * 60));
        assert_eq!(planned[0].priority, NotificationPriority::High);
        assert_eq!(planned[0].max_retries, 3);
    }

    #[test]
    fn test_negative_offsets_schedule_before_anchor() {
        let now = Utc::now();
        let pickup = now + Duration::hours(3);
        let rules = vec![
            ReminderRule::new(-24 * 60, "day before", "normal"),
            ReminderRule::new(-60, "hour before", "high"),
        ];
        let (planned, skipped) =
            plan_reminders(&event(pickup, vec![Uuid::new_v4()]), &rules, now, 3);
        assert_eq!(skipped, 1);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].scheduled_for, pickup - Duration::hours(1));
    }

    #[test]
    fn test_one_row_per_recipient_with_label() {
        let now = Utc::now();
        let rules = vec![ReminderRule::new(30, "Pay {label}", "urgent")];
        let (planned, _) = plan_reminders(
            &event(now, vec![Uuid::new_v4(), Uuid::new_v4()]),
            &rules,
            now,
            2,
        );
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|r| r.message == "Pay 42.00 EUR"));
        assert!(planned.iter().all(|r| r.kind == NotificationKind::PaymentPending));
        assert_ne!(planned[0].recipient_id, planned[1].recipient_id);
    }

    #[tokio::test]
    async fn test_writer_inserts_pending_rows() {
        let store = MemoryScheduledNotificationStore::new();
        let now = Utc::now();
        let writer = ReminderWriter::new(
            Arc::new(store.clone()),
            config_with(vec![
                ReminderRule::new(30, "+30", "normal"),
                ReminderRule::new(120, "+120", "normal"),
            ]),
        );

        let report = writer
            .schedule_reminders_for(&event(now, vec![Uuid::new_v4()]), now)
            .await;
        assert_eq!(report.scheduled.len(), 2);
        assert_eq!(report.failed, 0);

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == ScheduledStatus::Pending));
        assert!(rows.iter().all(|r| r.retry_count == 0));
    }

    #[tokio::test]
    async fn test_insert_failure_does_not_abort_batch() {
        let inner = MemoryScheduledNotificationStore::new();
        let store = FlakyStore::failing_inserts_containing(inner.clone(), "boom");
        let now = Utc::now();
        let writer = ReminderWriter::new(
            Arc::new(store),
            config_with(vec![
                ReminderRule::new(10, "first", "normal"),
                ReminderRule::new(20, "boom", "normal"),
                ReminderRule::new(30, "third", "normal"),
            ]),
        );

        let report = writer
            .schedule_reminders_for(&event(now, vec![Uuid::new_v4()]), now)
            .await;
        assert_eq!(report.scheduled.len(), 2);
        assert_eq!(report.failed, 1);

        let mut messages: Vec<String> =
            inner.snapshot().await.into_iter().map(|r| r.message).collect();
        messages.sort();
        assert_eq!(messages, vec!["first".to_string(), "third".to_string()]);
    }

    #[tokio::test]
    async fn test_notice_rows_are_due_immediately() {
        let store = MemoryScheduledNotificationStore::new();
        let now = Utc::now();
        let writer = ReminderWriter::new(Arc::new(store.clone()), NotificationConfig::default());
        let entity = Uuid::new_v4();
        let notice = EventNotice {
            kind: NotificationKind::NewAnnouncement,
            entity_id: Some(entity),
            recipients: vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            message: "Box of books".to_string(),
            priority: NotificationPriority::Low,
        };

        let report = writer.notify_now(&notice, now).await;
        assert_eq!(report.scheduled.len(), 3);
        assert_eq!(report.skipped, 0);

        let rows = store.snapshot().await;
        assert!(rows.iter().all(|r| r.scheduled_for == now && r.is_due(now)));
        assert!(rows.iter().all(|r| r.kind == NotificationKind::NewAnnouncement));
        assert!(rows.iter().all(|r| r.entity_id == Some(entity)));
    }

    #[test]
    fn test_notice_without_recipients_plans_nothing() {
        let notice = EventNotice {
            kind: NotificationKind::NewBid,
            entity_id: None,
            recipients: vec![],
            message: "nobody".to_string(),
            priority: NotificationPriority::Normal,
        };
        assert!(plan_notice(&notice, Utc::now(), 3).is_empty());
    }
}
