//! Background processing for EcoDeli.
//!
//! This crate provides:
//! - A poll loop that drives the notification runner
//! - A cron scheduler for marketplace maintenance (expiring stale
//!   announcements, releasing lapsed matches)

pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use runner::NotificationWorker;
pub use scheduler::CronScheduler;
