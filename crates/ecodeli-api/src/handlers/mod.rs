//! Route handlers organized by domain.

pub mod admin;
pub mod announcement;
pub mod auth;
pub mod bid;
pub mod booking;
pub mod delivery;
pub mod health;
pub mod notification;
pub mod payment;
pub mod subscription;
