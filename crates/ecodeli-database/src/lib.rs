//! # ecodeli-database
//!
//! PostgreSQL connection management, migrations, repositories for the
//! marketplace entities, and the scheduled-notification store used by the
//! notification scheduler.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    MemoryScheduledNotificationStore, PgScheduledNotificationStore, ScheduledNotificationStore,
};
