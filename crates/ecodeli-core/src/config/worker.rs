//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Notification runner and maintenance scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the in-process worker is enabled. Disable it when an
    /// external cron drives `ecodeli notifications process-due`.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between due-notification polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum number of rows claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    /// How long a claimed row stays invisible to other runners.
    #[serde(default = "default_lease")]
    pub lease_seconds: i64,
    /// Cron expression for expiring stale announcements.
    #[serde(default = "default_expire_cron")]
    pub expire_announcements_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: default_poll_interval(),
            batch_size: default_batch_size(),
            lease_seconds: default_lease(),
            expire_announcements_cron: default_expire_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    30
}

fn default_batch_size() -> i64 {
    100
}

fn default_lease() -> i64 {
    120
}

fn default_expire_cron() -> String {
    "0 0 * * * *".to_string()
}
