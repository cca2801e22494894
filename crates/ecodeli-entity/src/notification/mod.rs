//! Notification domain entities: scheduled reminders, the in-app inbox and
//! per-user channel preferences.

pub mod channel;
pub mod inbox;
pub mod kind;
pub mod preference;
pub mod priority;
pub mod scheduled;
pub mod status;

pub use channel::NotificationChannel;
pub use inbox::InboxNotification;
pub use kind::NotificationKind;
pub use preference::NotificationPreference;
pub use priority::NotificationPriority;
pub use scheduled::{NewScheduledNotification, ScheduledNotification};
pub use status::ScheduledStatus;
