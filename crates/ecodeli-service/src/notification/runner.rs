//! Scheduler runner: delivers due notifications and applies the retry policy.
//!
//! A pass claims due rows in batches (highest priority first), delivers each
//! one through the recipient's enabled channels and records the outcome:
//!
//! - delivered: the row becomes `sent` and an in-app copy is written;
//! - failed, retries left: `retry_count + 1`, rescheduled at
//!   `now + retry_delay`, still `pending`;
//! - failed, cap reached: the row becomes `failed`.
//!
//! The claim on a row is renewed right before it is attempted. A row whose
//! claim was taken over by another runner is skipped, so a slow batch never
//! sends what someone else already picked up.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use ecodeli_channel::{ChannelRegistry, OutboundMessage, Recipient};
use ecodeli_core::config::{NotificationConfig, WorkerConfig};
use ecodeli_core::result::AppResult;
use ecodeli_database::ScheduledNotificationStore;
use ecodeli_database::store::ClaimRequest;
use ecodeli_entity::notification::{
    NotificationChannel, NotificationPreference, ScheduledNotification,
};

/// A recipient's contact points together with their channel switches.
#[derive(Debug, Clone)]
pub struct ResolvedRecipient {
    /// Contact points.
    pub recipient: Recipient,
    /// Channel switches.
    pub preferences: NotificationPreference,
}

/// Looks up who a notification goes to.
#[async_trait]
pub trait RecipientDirectory: Send + Sync + std::fmt::Debug {
    /// Resolve a user, or `None` if the account no longer exists.
    async fn resolve(&self, user_id: Uuid) -> AppResult<Option<ResolvedRecipient>>;
}

/// Receives the in-app copy of every delivered notification.
#[async_trait]
pub trait InboxSink: Send + Sync + std::fmt::Debug {
    /// Record the in-app copy. Must be idempotent per scheduled row.
    async fn record(&self, row: &ScheduledNotification) -> AppResult<()>;
}

/// What to do with a row after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Put the row back in the queue.
    Retry {
        /// New retry count.
        retry_count: i32,
        /// Next due time.
        next_attempt_at: DateTime<Utc>,
    },
    /// Give up.
    Fail {
        /// Final retry count, never above the cap.
        retry_count: i32,
    },
}

/// Decide the outcome of a failed attempt.
pub fn retry_decision(
    retry_count: i32,
    max_retries: i32,
    now: DateTime<Utc>,
    delay: Duration,
) -> RetryDecision {
    let next = retry_count.saturating_add(1);
    if next < max_retries {
        RetryDecision::Retry {
            retry_count: next,
            next_attempt_at: now + delay,
        }
    } else {
        RetryDecision::Fail {
            retry_count: next.min(max_retries.max(0)),
        }
    }
}

/// Counters of one `process_due` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// Rows claimed.
    pub claimed: usize,
    /// Rows marked sent.
    pub sent: usize,
    /// Rows rescheduled for another attempt.
    pub retried: usize,
    /// Rows marked failed.
    pub failed: usize,
    /// Rows handed back unprocessed.
    pub released: usize,
    /// Rows skipped or outcome writes refused because another runner holds
    /// the row now.
    pub lost: usize,
    /// Rows whose processing hit a storage error; released for a later pass.
    pub errored: usize,
}

enum Attempt {
    Delivered(Vec<NotificationChannel>),
    Failed(String),
    Unresolved(String),
}

/// Delivers due scheduled notifications.
#[derive(Debug, Clone)]
pub struct NotificationRunner {
    store: Arc<dyn ScheduledNotificationStore>,
    directory: Arc<dyn RecipientDirectory>,
    inbox: Arc<dyn InboxSink>,
    channels: ChannelRegistry,
    runner_id: String,
    batch_size: i64,
    lease: Duration,
    retry_delay: Duration,
}

impl NotificationRunner {
    /// Creates a new runner.
    pub fn new(
        store: Arc<dyn ScheduledNotificationStore>,
        directory: Arc<dyn RecipientDirectory>,
        inbox: Arc<dyn InboxSink>,
        channels: ChannelRegistry,
        notifications: &NotificationConfig,
        worker: &WorkerConfig,
    ) -> Self {
        let lease = lease_for(worker.lease_seconds, channels.send_budget());
        if lease.num_seconds() > worker.lease_seconds {
            warn!(
                configured = worker.lease_seconds,
                lease_seconds = lease.num_seconds(),
                "Claim lease shorter than the channel timeouts, raised"
            );
        }
        Self {
            store,
            directory,
            inbox,
            channels,
            runner_id: format!("runner-{}", Uuid::new_v4()),
            batch_size: worker.batch_size.max(1),
            lease,
            retry_delay: Duration::minutes(notifications.retry_delay_minutes),
        }
    }

    /// A copy sharing every collaborator under a fresh identity, so that
    /// two callers never complete each other's claims.
    pub fn fork(&self, role: &str) -> Self {
        self.clone().with_runner_id(format!("{role}-{}", Uuid::new_v4()))
    }

    /// Override the runner identity written to claimed rows.
    pub fn with_runner_id(mut self, runner_id: impl Into<String>) -> Self {
        self.runner_id = runner_id.into();
        self
    }

    /// Identity written to claimed rows.
    pub fn runner_id(&self) -> &str {
        &self.runner_id
    }

    /// Deliver every row due at `now`.
    pub async fn process_due(&self, now: DateTime<Utc>) -> AppResult<ProcessReport> {
        let mut report = ProcessReport::default();
        let mut seen: HashSet<Uuid> = HashSet::new();
        let started = Instant::now();

        loop {
            let batch = self
                .store
                .claim_due(&ClaimRequest {
                    runner_id: &self.runner_id,
                    now,
                    lease: self.lease,
                    limit: self.batch_size,
                })
                .await?;

            let batch_len = batch.len();
            let mut progressed = false;
            for row in batch {
                let id = row.id;
                if !seen.insert(id) {
                    // Released earlier in this pass; leave it for the next one.
                    self.release_quietly(id).await;
                    continue;
                }
                report.claimed += 1;
                progressed = true;

                let spent =
                    Duration::from_std(started.elapsed()).unwrap_or_else(|_| Duration::zero());
                let clock = now + spent;
                if let Err(e) = self.process_row(row, now, clock, &mut report).await {
                    error!(%id, error = %e, "Failed to process notification, releasing");
                    report.errored += 1;
                    self.release_quietly(id).await;
                }
            }

            if batch_len < self.batch_size as usize || !progressed {
                break;
            }
        }

        if report.claimed > 0 {
            info!(
                runner_id = %self.runner_id,
                claimed = report.claimed,
                sent = report.sent,
                retried = report.retried,
                failed = report.failed,
                released = report.released,
                lost = report.lost,
                errored = report.errored,
                "Due notifications processed"
            );
        }
        Ok(report)
    }

    async fn release_quietly(&self, id: Uuid) {
        if let Err(e) = self.store.release(id, &self.runner_id).await {
            warn!(%id, error = %e, "Failed to release notification claim");
        }
    }

    /// `now` stamps the outcome; `clock` is the pass time plus the time
    /// already spent in it and dates the renewed claim.
    async fn process_row(
        &self,
        row: ScheduledNotification,
        now: DateTime<Utc>,
        clock: DateTime<Utc>,
        report: &mut ProcessReport,
    ) -> AppResult<()> {
        if !self
            .store
            .renew_claim(row.id, &self.runner_id, clock, self.lease)
            .await?
        {
            warn!(id = %row.id, "Notification claim taken over before delivery, skipping");
            report.lost += 1;
            return Ok(());
        }

        match self.attempt(&row).await {
            Attempt::Delivered(channels) => {
                if self.store.mark_sent(row.id, &self.runner_id, now).await? {
                    debug!(id = %row.id, kind = %row.kind, ?channels, "Notification sent");
                    report.sent += 1;
                } else {
                    warn!(id = %row.id, "Notification claim lost before marking sent");
                    report.lost += 1;
                }
            }
            Attempt::Failed(reason) => self.record_failure(&row, &reason, now, report).await?,
            Attempt::Unresolved(reason) => {
                error!(id = %row.id, error = %reason, "Could not resolve recipient, releasing");
                self.store.release(row.id, &self.runner_id).await?;
                report.released += 1;
            }
        }
        Ok(())
    }

    async fn attempt(&self, row: &ScheduledNotification) -> Attempt {
        let resolved = match self.directory.resolve(row.recipient_id).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => return Attempt::Failed("Recipient no longer exists".to_string()),
            Err(e) => return Attempt::Unresolved(e.to_string()),
        };

        let message = OutboundMessage::from_scheduled(row, resolved.recipient);
        let targets: Vec<_> = resolved
            .preferences
            .external_channels()
            .into_iter()
            .filter_map(|channel| self.channels.get(channel))
            .collect();

        let mut delivered = Vec::new();
        let mut errors = Vec::new();
        for sender in targets {
            match sender.send(&message).await {
                Ok(()) => delivered.push(sender.channel()),
                Err(e) => {
                    warn!(
                        id = %row.id,
                        channel = %sender.channel(),
                        error = %e,
                        "Channel delivery failed"
                    );
                    errors.push(format!("{}: {}", sender.channel(), e.message));
                }
            }
        }

        if delivered.is_empty() && !errors.is_empty() {
            return Attempt::Failed(errors.join("; "));
        }

        if let Err(e) = self.inbox.record(row).await {
            return Attempt::Failed(format!("in_app: {}", e.message));
        }
        delivered.push(NotificationChannel::InApp);
        Attempt::Delivered(delivered)
    }

    async fn record_failure(
        &self,
        row: &ScheduledNotification,
        reason: &str,
        now: DateTime<Utc>,
        report: &mut ProcessReport,
    ) -> AppResult<()> {
        let decision = retry_decision(row.retry_count, row.max_retries, now, self.retry_delay);
        let applied = match decision {
            RetryDecision::Retry {
                retry_count,
                next_attempt_at,
            } => {
                let ok = self
                    .store
                    .reschedule(row.id, &self.runner_id, retry_count, next_attempt_at, reason)
                    .await?;
                if ok {
                    info!(
                        id = %row.id,
                        retry_count,
                        next_attempt_at = %next_attempt_at,
                        error = %reason,
                        "Notification delivery failed, rescheduled"
                    );
                    report.retried += 1;
                }
                ok
            }
            RetryDecision::Fail { retry_count } => {
                let ok = self
                    .store
                    .mark_failed(row.id, &self.runner_id, retry_count, reason, now)
                    .await?;
                if ok {
                    warn!(
                        id = %row.id,
                        retry_count,
                        error = %reason,
                        "Notification delivery failed permanently"
                    );
                    report.failed += 1;
                }
                ok
            }
        };

        if !applied {
            warn!(id = %row.id, "Notification claim lost before recording failure");
            report.lost += 1;
        }
        Ok(())
    }
}

/// Configured lease, raised when needed so that one row's worst-case
/// delivery fits inside it.
fn lease_for(configured_seconds: i64, send_budget: std::time::Duration) -> Duration {
    const MARGIN_SECONDS: i64 = 30;
    let budget = i64::try_from(send_budget.as_secs()).unwrap_or(i64::MAX / 2);
    Duration::seconds(configured_seconds.max(budget + MARGIN_SECONDS).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::testing::{FlakyStore, MemoryInbox, StaticDirectory};
    use ecodeli_channel::{ChannelSender, ScriptedSender};
    use tokio::sync::Notify;
    use ecodeli_database::MemoryScheduledNotificationStore;
    use ecodeli_entity::notification::{
        NewScheduledNotification, NotificationKind, NotificationPriority, ScheduledStatus,
    };

    use crate::notification::event::{ReminderEvent, ReminderTrigger};
    use crate::notification::writer::ReminderWriter;
    use ecodeli_core::config::notification::ReminderRule;

    struct Harness {
        store: MemoryScheduledNotificationStore,
        directory: StaticDirectory,
        inbox: MemoryInbox,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: MemoryScheduledNotificationStore::new(),
                directory: StaticDirectory::default(),
                inbox: MemoryInbox::default(),
            }
        }

        fn runner(&self, channels: ChannelRegistry) -> NotificationRunner {
            self.runner_over(Arc::new(self.store.clone()), channels)
        }

        fn runner_over(
            &self,
            store: Arc<dyn ScheduledNotificationStore>,
            channels: ChannelRegistry,
        ) -> NotificationRunner {
            let worker = WorkerConfig {
                batch_size: 2,
                ..WorkerConfig::default()
            };
            NotificationRunner::new(
                store,
                Arc::new(self.directory.clone()),
                Arc::new(self.inbox.clone()),
                channels,
                &NotificationConfig::default(),
                &worker,
            )
        }

        async fn schedule(
            &self,
            recipient: Uuid,
            at: DateTime<Utc>,
            priority: NotificationPriority,
            max_retries: i32,
        ) -> Uuid {
            self.store
                .insert(&NewScheduledNotification {
                    recipient_id: recipient,
                    entity_id: Some(Uuid::new_v4()),
                    kind: NotificationKind::PickupReminder,
                    scheduled_for: at,
                    message: format!("{priority} reminder"),
                    priority,
                    max_retries,
                })
                .await
                .unwrap()
                .id
        }

        async fn row(&self, id: Uuid) -> ScheduledNotification {
            self.store.find_by_id(id).await.unwrap().unwrap()
        }
    }

    fn email_registry(sender: Arc<ScriptedSender>) -> ChannelRegistry {
        ChannelRegistry::new().with_sender(sender)
    }

    /// Email sender whose first delivery blocks until `gate` is notified.
    #[derive(Debug, Default)]
    struct GatedSender {
        entered: Notify,
        gate: Notify,
        sent: std::sync::Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl ChannelSender for GatedSender {
        fn channel(&self) -> NotificationChannel {
            NotificationChannel::Email
        }

        async fn send(&self, message: &OutboundMessage) -> AppResult<()> {
            let first = {
                let mut sent = self.sent.lock().unwrap();
                sent.push(message.notification_id);
                sent.len() == 1
            };
            if first {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            Ok(())
        }
    }

    #[test]
    fn test_lease_covers_channel_timeouts() {
        assert_eq!(lease_for(120, std::time::Duration::ZERO), Duration::seconds(120));
        assert_eq!(
            lease_for(20, std::time::Duration::from_secs(30)),
            Duration::seconds(60)
        );
        assert_eq!(lease_for(0, std::time::Duration::ZERO), Duration::seconds(30));
    }

    #[test]
    fn test_forked_runners_have_distinct_identities() {
        let h = Harness::new();
        let runner = h.runner(ChannelRegistry::new());
        let worker = runner.fork("worker");
        let api = runner.fork("api");
        assert!(worker.runner_id().starts_with("worker-"));
        assert!(api.runner_id().starts_with("api-"));
        assert_ne!(worker.runner_id(), api.runner_id());
        assert_ne!(worker.runner_id(), runner.runner_id());
    }

    #[test]
    fn test_retry_decision_never_exceeds_cap() {
        let now = Utc::now();
        let delay = Duration::minutes(5);
        assert_eq!(
            retry_decision(0, 3, now, delay),
            RetryDecision::Retry {
                retry_count: 1,
                next_attempt_at: now + delay
            }
        );
        assert_eq!(
            retry_decision(1, 3, now, delay),
            RetryDecision::Retry {
                retry_count: 2,
                next_attempt_at: now + delay
            }
        );
        assert_eq!(retry_decision(2, 3, now, delay), RetryDecision::Fail { retry_count: 3 });
        assert_eq!(retry_decision(0, 0, now, delay), RetryDecision::Fail { retry_count: 0 });
    }

    #[tokio::test]
    async fn test_future_rows_are_never_selected() {
        let h = Harness::new();
        let user = h.directory.add_user("future@example.com");
        let now = Utc::now();
        let future = h
            .schedule(user, now + Duration::seconds(1), NotificationPriority::Urgent, 3)
            .await;

        let report = h.runner(ChannelRegistry::new()).process_due(now).await.unwrap();
        assert_eq!(report, ProcessReport::default());
        assert_eq!(h.row(future).await.status, ScheduledStatus::Pending);
    }

    #[tokio::test]
    async fn test_scenario_only_the_elapsed_reminder_is_sent() {
        let h = Harness::new();
        let user = h.directory.add_user("client@example.com");
        let t = Utc::now();

        let mut config = NotificationConfig::default();
        config.reminders.payment_pending = vec![
            ReminderRule::new(30, "+30min", "normal"),
            ReminderRule::new(120, "+120min", "normal"),
        ];
        let writer = ReminderWriter::new(Arc::new(h.store.clone()), config);
        let event = ReminderEvent {
            trigger: ReminderTrigger::PaymentPending,
            anchor: t,
            entity_id: Some(Uuid::new_v4()),
            recipients: vec![user],
            label: "order".into(),
        };
        let scheduled = writer.schedule_reminders_for(&event, t).await;
        assert_eq!(scheduled.scheduled.len(), 2);

        let email = Arc::new(ScriptedSender::succeeding(NotificationChannel::Email));
        let report = h
            .runner(email_registry(email.clone()))
            .process_due(t + Duration::minutes(31))
            .await
            .unwrap();
        assert_eq!(report.sent, 1);

        let rows = h.store.snapshot().await;
        let sent: Vec<_> = rows.iter().filter(|r| r.status == ScheduledStatus::Sent).collect();
        let pending: Vec<_> = rows
            .iter()
            .filter(|r| r.status == ScheduledStatus::Pending)
            .collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message, "+30min");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].message, "+120min");
        assert_eq!(email.attempts().len(), 1);
        assert_eq!(h.inbox.recorded(), vec![sent[0].id]);
    }

    #[tokio::test]
    async fn test_rows_are_processed_by_priority() {
        let h = Harness::new();
        let user = h.directory.add_user("p@example.com");
        let now = Utc::now();
        h.schedule(user, now - Duration::minutes(10), NotificationPriority::Low, 3).await;
        h.schedule(user, now - Duration::minutes(5), NotificationPriority::Urgent, 3).await;
        h.schedule(user, now - Duration::minutes(1), NotificationPriority::High, 3).await;

        let email = Arc::new(ScriptedSender::succeeding(NotificationChannel::Email));
        let report = h.runner(email_registry(email.clone())).process_due(now).await.unwrap();
        assert_eq!(report.sent, 3);

        let order: Vec<NotificationPriority> =
            email.attempts().iter().map(|m| m.priority).collect();
        assert_eq!(
            order,
            vec![
                NotificationPriority::Urgent,
                NotificationPriority::High,
                NotificationPriority::Low
            ]
        );
    }

    #[tokio::test]
    async fn test_failures_retry_then_fail_at_cap() {
        let h = Harness::new();
        let user = h.directory.add_user("flaky@example.com");
        let t0 = Utc::now();
        let id = h.schedule(user, t0, NotificationPriority::Normal, 3).await;

        let email = Arc::new(ScriptedSender::failing(NotificationChannel::Email));
        let runner = h.runner(email_registry(email.clone()));

        let mut now = t0;
        let mut seen_counts = Vec::new();
        for _ in 0..3 {
            runner.process_due(now).await.unwrap();
            let row = h.row(id).await;
            seen_counts.push(row.retry_count);
            assert!(row.retry_count <= row.max_retries);
            now = row.scheduled_for.max(now) + Duration::seconds(1);
            // A pass before the retry delay elapses does nothing.
            if row.status == ScheduledStatus::Pending {
                assert_eq!(row.scheduled_for, now - Duration::seconds(1));
                let early = runner.process_due(now - Duration::minutes(1)).await.unwrap();
                assert_eq!(early.claimed, 0);
            }
        }
        assert_eq!(seen_counts, vec![1, 2, 3]);

        let row = h.row(id).await;
        assert_eq!(row.status, ScheduledStatus::Failed);
        assert!(row.last_error.unwrap_or_default().contains("email"));

        // Terminal: further passes never touch it again.
        let later = runner.process_due(now + Duration::hours(1)).await.unwrap();
        assert_eq!(later.claimed, 0);
        assert_eq!(email.attempts().len(), 3);
        assert!(h.inbox.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_retry_is_scheduled_after_the_configured_delay() {
        let h = Harness::new();
        let user = h.directory.add_user("delay@example.com");
        let now = Utc::now();
        let id = h.schedule(user, now, NotificationPriority::Normal, 3).await;

        let email = Arc::new(ScriptedSender::failing(NotificationChannel::Email));
        let report = h.runner(email_registry(email)).process_due(now).await.unwrap();
        assert_eq!(report.retried, 1);

        let row = h.row(id).await;
        assert_eq!(row.status, ScheduledStatus::Pending);
        assert_eq!(row.retry_count, 1);
        assert_eq!(row.scheduled_for, now + Duration::minutes(5));
    }

    #[tokio::test]
    async fn test_terminal_rows_are_not_mutated() {
        let h = Harness::new();
        let user = h.directory.add_user("t@example.com");
        let now = Utc::now();
        let id = h.schedule(user, now, NotificationPriority::Normal, 3).await;

        let runner = h.runner(ChannelRegistry::new());
        runner.process_due(now).await.unwrap();
        let sent = h.row(id).await;
        assert_eq!(sent.status, ScheduledStatus::Sent);

        let again = runner.process_due(now + Duration::days(1)).await.unwrap();
        assert_eq!(again.claimed, 0);
        let after = h.row(id).await;
        assert_eq!(after.status, ScheduledStatus::Sent);
        assert_eq!(after.updated_at, sent.updated_at);
        assert_eq!(h.inbox.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_no_enabled_channel_means_in_app_only_success() {
        let h = Harness::new();
        let user = h.directory.add_user("quiet@example.com");
        h.directory.update(user, |p| {
            p.email_enabled = false;
            p.push_enabled = false;
        });
        let now = Utc::now();
        let id = h.schedule(user, now, NotificationPriority::Normal, 3).await;

        let email = Arc::new(ScriptedSender::failing(NotificationChannel::Email));
        let report = h.runner(email_registry(email.clone())).process_due(now).await.unwrap();
        assert_eq!(report.sent, 1);
        assert!(email.attempts().is_empty());
        assert_eq!(h.row(id).await.status, ScheduledStatus::Sent);
    }

    #[tokio::test]
    async fn test_one_successful_channel_is_enough() {
        let h = Harness::new();
        let user = h.directory.add_user("multi@example.com");
        h.directory.update(user, |p| {
            p.sms_enabled = true;
            p.phone = Some("+33600000000".into());
        });
        let now = Utc::now();
        let id = h.schedule(user, now, NotificationPriority::Normal, 3).await;

        let email = Arc::new(ScriptedSender::failing(NotificationChannel::Email));
        let sms = Arc::new(ScriptedSender::succeeding(NotificationChannel::Sms));
        let registry = ChannelRegistry::new()
            .with_sender(email.clone())
            .with_sender(sms.clone());

        let report = h.runner(registry).process_due(now).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(email.attempts().len(), 1);
        assert_eq!(sms.attempts().len(), 1);
        assert_eq!(h.row(id).await.status, ScheduledStatus::Sent);
    }

    #[tokio::test]
    async fn test_disabled_channel_is_not_attempted() {
        let h = Harness::new();
        let user = h.directory.add_user("nosms@example.com");
        let now = Utc::now();
        h.schedule(user, now, NotificationPriority::Normal, 3).await;

        // SMS is registered but the user keeps it switched off.
        let email = Arc::new(ScriptedSender::succeeding(NotificationChannel::Email));
        let sms = Arc::new(ScriptedSender::succeeding(NotificationChannel::Sms));
        let registry = ChannelRegistry::new()
            .with_sender(email.clone())
            .with_sender(sms.clone());

        h.runner(registry).process_due(now).await.unwrap();
        assert_eq!(email.attempts().len(), 1);
        assert!(sms.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_leased_rows_are_skipped_by_a_second_runner() {
        let h = Harness::new();
        let user = h.directory.add_user("lease@example.com");
        let now = Utc::now();
        let id = h.schedule(user, now, NotificationPriority::Normal, 3).await;

        let first = h.runner(ChannelRegistry::new()).with_runner_id("first");
        let second = h.runner(ChannelRegistry::new()).with_runner_id("second");

        // The first runner claims the row but has not finished with it.
        let claimed = h
            .store
            .claim_due(&ClaimRequest {
                runner_id: first.runner_id(),
                now,
                lease: Duration::minutes(2),
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(claimed.len(), 1);

        let report = second.process_due(now).await.unwrap();
        assert_eq!(report.claimed, 0);
        assert_eq!(h.row(id).await.status, ScheduledStatus::Pending);

        // Outcome writes from a runner that does not hold the claim are refused.
        assert!(!h.store.mark_sent(id, second.runner_id(), now).await.unwrap());
        assert!(h.store.mark_sent(id, first.runner_id(), now).await.unwrap());
        assert_eq!(h.row(id).await.status, ScheduledStatus::Sent);
    }

    #[tokio::test]
    async fn test_missing_recipient_counts_as_failed_attempt() {
        let h = Harness::new();
        let now = Utc::now();
        let id = h.schedule(Uuid::new_v4(), now, NotificationPriority::Normal, 1).await;

        let report = h.runner(ChannelRegistry::new()).process_due(now).await.unwrap();
        assert_eq!(report.failed, 1);
        let row = h.row(id).await;
        assert_eq!(row.status, ScheduledStatus::Failed);
        assert_eq!(row.retry_count, 1);
    }

    #[tokio::test]
    async fn test_batches_are_drained_in_one_pass() {
        let h = Harness::new();
        let user = h.directory.add_user("many@example.com");
        let now = Utc::now();
        for i in 0..5 {
            h.schedule(user, now - Duration::minutes(i), NotificationPriority::Normal, 3).await;
        }

        // Batch size is 2 in the harness.
        let report = h.runner(ChannelRegistry::new()).process_due(now).await.unwrap();
        assert_eq!(report.claimed, 5);
        assert_eq!(report.sent, 5);
    }

    #[tokio::test]
    async fn test_row_taken_over_after_lease_is_not_sent_again() {
        let h = Harness::new();
        let user = h.directory.add_user("slow@example.com");
        let t = Utc::now();
        let a = h
            .schedule(user, t - Duration::minutes(1), NotificationPriority::Normal, 3)
            .await;
        let b = h.schedule(user, t, NotificationPriority::Normal, 3).await;

        // The first runner claims both rows and stalls on the first send.
        let gated = Arc::new(GatedSender::default());
        let first = h
            .runner(ChannelRegistry::new().with_sender(gated.clone()))
            .with_runner_id("first");
        let pass = tokio::spawn({
            let first = first.clone();
            async move { first.process_due(t).await }
        });
        gated.entered.notified().await;

        // Past the lease, a second runner takes both rows over and sends them.
        let email = Arc::new(ScriptedSender::succeeding(NotificationChannel::Email));
        let second = h.runner(email_registry(email.clone())).with_runner_id("second");
        let lease = Duration::seconds(WorkerConfig::default().lease_seconds);
        let takeover = second
            .process_due(t + lease + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(takeover.sent, 2);

        gated.gate.notify_one();
        let report = pass.await.unwrap().unwrap();
        assert_eq!(report.claimed, 2);
        assert_eq!(report.sent, 0);
        assert_eq!(report.lost, 2);

        // Row b never left through the stalled runner.
        assert_eq!(gated.sent.lock().unwrap().clone(), vec![a]);
        assert_eq!(email.attempts().len(), 2);
        assert_eq!(h.row(b).await.status, ScheduledStatus::Sent);
        assert_eq!(h.inbox.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_store_error_on_one_row_does_not_stall_the_batch() {
        let h = Harness::new();
        let user = h.directory.add_user("batch@example.com");
        let now = Utc::now();
        let normal = NotificationPriority::Normal;
        let first = h.schedule(user, now - Duration::minutes(3), normal, 3).await;
        let broken = h.schedule(user, now - Duration::minutes(2), normal, 3).await;
        let last = h.schedule(user, now - Duration::minutes(1), normal, 3).await;

        let flaky = FlakyStore::failing_mark_sent_for(h.store.clone(), broken);
        let report = h
            .runner_over(Arc::new(flaky), ChannelRegistry::new())
            .process_due(now)
            .await
            .unwrap();
        assert_eq!(report.claimed, 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.errored, 1);
        assert_eq!(h.row(first).await.status, ScheduledStatus::Sent);
        assert_eq!(h.row(last).await.status, ScheduledStatus::Sent);

        // The failing row was handed back rather than left leased.
        let stuck = h.row(broken).await;
        assert_eq!(stuck.status, ScheduledStatus::Pending);
        assert!(stuck.claimed_by.is_none());

        let retry = h.runner(ChannelRegistry::new()).process_due(now).await.unwrap();
        assert_eq!(retry.sent, 1);
        assert_eq!(h.row(broken).await.status, ScheduledStatus::Sent);
    }
}
