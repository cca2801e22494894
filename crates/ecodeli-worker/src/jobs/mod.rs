//! Scheduled job implementations.

pub mod maintenance;

pub use maintenance::{MaintenanceReport, run_marketplace_maintenance};
