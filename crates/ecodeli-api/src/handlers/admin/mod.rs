//! Admin-only handlers.

pub mod audit;
pub mod notifications;
pub mod stats;
pub mod users;
