//! Notification scheduling configuration.
//!
//! Reminder tables map each domain event to a list of
//! `(offset, message, priority)` rules. Offsets are signed minutes relative
//! to the event's anchor timestamp, so a negative offset produces a reminder
//! before the anchor (e.g. ahead of a pickup). Messages may contain a
//! `{label}` placeholder that is replaced with the entity's display label.

use serde::{Deserialize, Serialize};

/// Scheduler writer and runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Retry cap stored on every new scheduled notification.
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    /// Delay applied when a failed delivery is rescheduled.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_minutes: i64,
    /// Reminder tables per event.
    #[serde(default)]
    pub reminders: ReminderTables,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_minutes: default_retry_delay(),
            reminders: ReminderTables::default(),
        }
    }
}

/// One reminder rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRule {
    /// Signed offset from the anchor timestamp, in minutes.
    pub offset_minutes: i64,
    /// Message template; `{label}` is substituted.
    pub message: String,
    /// Priority name: `low`, `normal`, `high` or `urgent`.
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl ReminderRule {
    /// Convenience constructor used by the default tables and tests.
    pub fn new(offset_minutes: i64, message: &str, priority: &str) -> Self {
        Self {
            offset_minutes,
            message: message.to_string(),
            priority: priority.to_string(),
        }
    }
}

/// Reminder tables keyed by domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderTables {
    /// Anchored on publication; nudges the client while no bid is accepted.
    #[serde(default = "default_announcement_published")]
    pub announcement_published: Vec<ReminderRule>,
    /// Anchored on payment creation.
    #[serde(default = "default_payment_pending")]
    pub payment_pending: Vec<ReminderRule>,
    /// Anchored on the match expiry.
    #[serde(default = "default_match_expiring")]
    pub match_expiring: Vec<ReminderRule>,
    /// Anchored on the delivery pickup time.
    #[serde(default = "default_delivery_scheduled")]
    pub delivery_scheduled: Vec<ReminderRule>,
    /// Anchored on the booking start time.
    #[serde(default = "default_booking_scheduled")]
    pub booking_scheduled: Vec<ReminderRule>,
    /// Anchored on the moment a delivery was marked delivered.
    #[serde(default = "default_delivery_delivered")]
    pub delivery_delivered: Vec<ReminderRule>,
    /// Anchored on the admin decision.
    #[serde(default = "default_account_validated")]
    pub account_validated: Vec<ReminderRule>,
}

impl Default for ReminderTables {
    fn default() -> Self {
        Self {
            announcement_published: default_announcement_published(),
            payment_pending: default_payment_pending(),
            match_expiring: default_match_expiring(),
            delivery_scheduled: default_delivery_scheduled(),
            booking_scheduled: default_booking_scheduled(),
            delivery_delivered: default_delivery_delivered(),
            account_validated: default_account_validated(),
        }
    }
}

fn default_max_retries() -> i32 {
    3
}

fn default_retry_delay() -> i64 {
    5
}

fn default_priority() -> String {
    "normal".to_string()
}

fn default_announcement_published() -> Vec<ReminderRule> {
    vec![
        ReminderRule::new(
            24 * 60,
            "Your announcement \"{label}\" has not been matched yet",
            "normal",
        ),
        ReminderRule::new(
            72 * 60,
            "Your announcement \"{label}\" is still unmatched, consider adjusting the price",
            "high",
        ),
    ]
}

fn default_payment_pending() -> Vec<ReminderRule> {
    vec![
        ReminderRule::new(60, "Payment for {label} is awaiting completion", "normal"),
        ReminderRule::new(
            24 * 60,
            "Payment for {label} is still pending and will be cancelled soon",
            "high",
        ),
    ]
}

fn default_match_expiring() -> Vec<ReminderRule> {
    vec![
        ReminderRule::new(-120, "The match for {label} expires in 2 hours", "high"),
        ReminderRule::new(-30, "The match for {label} expires in 30 minutes", "urgent"),
    ]
}

fn default_delivery_scheduled() -> Vec<ReminderRule> {
    vec![
        ReminderRule::new(-24 * 60, "Pickup for {label} is scheduled tomorrow", "normal"),
        ReminderRule::new(-60, "Pickup for {label} starts in one hour", "high"),
    ]
}

fn default_booking_scheduled() -> Vec<ReminderRule> {
    vec![
        ReminderRule::new(-24 * 60, "Your booking \"{label}\" takes place tomorrow", "normal"),
        ReminderRule::new(-60, "Your booking \"{label}\" starts in one hour", "high"),
    ]
}

fn default_delivery_delivered() -> Vec<ReminderRule> {
    vec![ReminderRule::new(
        24 * 60,
        "Please confirm reception of {label}",
        "normal",
    )]
}

fn default_account_validated() -> Vec<ReminderRule> {
    vec![ReminderRule::new(1, "{label}", "high")]
}
