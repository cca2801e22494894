//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use ecodeli_core::config::WorkerConfig;
use ecodeli_core::error::AppError;
use ecodeli_service::AnnouncementService;

use crate::jobs::run_marketplace_maintenance;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Announcement lifecycle service used by maintenance jobs
    announcements: Arc<AnnouncementService>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(announcements: Arc<AnnouncementService>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            announcements,
        })
    }

    /// Register all default scheduled tasks
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register_marketplace_maintenance(&config.expire_announcements_cron)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Expire overdue announcements and release lapsed matches.
    async fn register_marketplace_maintenance(&self, schedule: &str) -> Result<(), AppError> {
        let announcements = Arc::clone(&self.announcements);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let announcements = Arc::clone(&announcements);
            Box::pin(async move {
                if let Err(e) = run_marketplace_maintenance(&announcements, Utc::now()).await {
                    tracing::error!(error = %e, "Marketplace maintenance failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid marketplace maintenance schedule '{schedule}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add marketplace maintenance schedule: {e}"))
        })?;

        tracing::info!(%schedule, "Registered: marketplace_maintenance");
        Ok(())
    }
}
