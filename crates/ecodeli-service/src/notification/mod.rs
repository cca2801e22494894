//! Notification scheduling: the reminder and event-notice writer, the
//! delivery runner, and inbox/preference management.

pub mod directory;
pub mod event;
pub mod runner;
pub mod service;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use directory::PgRecipientDirectory;
pub use event::{EventNotice, ReminderEvent, ReminderTrigger};
pub use runner::{
    InboxSink, NotificationRunner, ProcessReport, RecipientDirectory, ResolvedRecipient,
    RetryDecision, retry_decision,
};
pub use service::{NotificationService, PreferenceUpdate};
pub use writer::{ReminderWriter, ScheduleReport, plan_notice, plan_reminders};
