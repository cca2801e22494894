//! Worker loop: polls the notification runner until shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time;

use ecodeli_core::config::WorkerConfig;
use ecodeli_service::notification::{NotificationRunner, ProcessReport};

/// Calls `process_due` every poll interval.
#[derive(Debug)]
pub struct NotificationWorker {
    /// The notification runner
    runner: Arc<NotificationRunner>,
    /// Worker configuration
    config: WorkerConfig,
}

impl NotificationWorker {
    /// Create a new worker
    pub fn new(runner: Arc<NotificationRunner>, config: WorkerConfig) -> Self {
        Self { runner, config }
    }

    /// Run one pass; errors are logged and reported as an empty pass.
    pub async fn tick(&self) -> ProcessReport {
        match self.runner.process_due(Utc::now()).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    runner_id = %self.runner.runner_id(),
                    error = %e,
                    "Notification pass failed"
                );
                ProcessReport::default()
            }
        }
    }

    /// Start the loop — runs until the cancel signal is received
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            runner_id = %self.runner.runner_id(),
            poll_interval_seconds = self.config.poll_interval_seconds,
            batch_size = self.config.batch_size,
            "Notification worker started"
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds.max(1));

        loop {
            if *cancel.borrow() {
                break;
            }

            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Notification worker received shutdown signal");
                        break;
                    }
                }
                _ = self.tick() => {
                    tokio::select! {
                        changed = cancel.changed() => {
                            if changed.is_err() || *cancel.borrow() {
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(runner_id = %self.runner.runner_id(), "Notification worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;

    use ecodeli_channel::{ChannelRegistry, Recipient};
    use ecodeli_core::config::NotificationConfig;
    use ecodeli_core::result::AppResult;
    use ecodeli_database::{MemoryScheduledNotificationStore, ScheduledNotificationStore};
    use ecodeli_entity::notification::{
        NewScheduledNotification, NotificationKind, NotificationPreference, NotificationPriority,
        ScheduledNotification, ScheduledStatus,
    };
    use ecodeli_service::notification::{InboxSink, RecipientDirectory, ResolvedRecipient};

    #[derive(Debug)]
    struct EveryoneDirectory;

    #[async_trait]
    impl RecipientDirectory for EveryoneDirectory {
        async fn resolve(&self, user_id: Uuid) -> AppResult<Option<ResolvedRecipient>> {
            Ok(Some(ResolvedRecipient {
                recipient: Recipient {
                    user_id,
                    name: "Test".into(),
                    email: "test@ecodeli.fr".into(),
                    phone: None,
                    push_token: None,
                },
                preferences: NotificationPreference::default_for_user(user_id),
            }))
        }
    }

    #[derive(Debug)]
    struct NullInbox;

    #[async_trait]
    impl InboxSink for NullInbox {
        async fn record(&self, _row: &ScheduledNotification) -> AppResult<()> {
            Ok(())
        }
    }

    fn worker(store: &MemoryScheduledNotificationStore) -> NotificationWorker {
        let config = WorkerConfig {
            poll_interval_seconds: 1,
            ..WorkerConfig::default()
        };
        let runner = NotificationRunner::new(
            Arc::new(store.clone()),
            Arc::new(EveryoneDirectory),
            Arc::new(NullInbox),
            ChannelRegistry::new(),
            &NotificationConfig::default(),
            &config,
        );
        NotificationWorker::new(Arc::new(runner), config)
    }

    async fn schedule(store: &MemoryScheduledNotificationStore, offset_minutes: i64) -> Uuid {
        store
            .insert(&NewScheduledNotification {
                recipient_id: Uuid::new_v4(),
                entity_id: None,
                kind: NotificationKind::PaymentPending,
                scheduled_for: Utc::now() + ChronoDuration::minutes(offset_minutes),
                message: "Pay".into(),
                priority: NotificationPriority::Normal,
                max_retries: 3,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_tick_sends_only_due_rows() {
        let store = MemoryScheduledNotificationStore::new();
        let due = schedule(&store, -5).await;
        let later = schedule(&store, 60).await;

        let report = worker(&store).tick().await;
        assert_eq!(report.sent, 1);

        let due = store.find_by_id(due).await.unwrap().unwrap();
        let later = store.find_by_id(later).await.unwrap().unwrap();
        assert_eq!(due.status, ScheduledStatus::Sent);
        assert_eq!(later.status, ScheduledStatus::Pending);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = MemoryScheduledNotificationStore::new();
        let id = schedule(&store, -1).await;
        let worker = Arc::new(worker(&store));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn({
            let worker = Arc::clone(&worker);
            async move { worker.run(rx).await }
        });

        time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker did not stop")
            .unwrap();

        let row = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(row.status, ScheduledStatus::Sent);
    }
}
