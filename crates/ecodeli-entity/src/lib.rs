//! # ecodeli-entity
//!
//! Domain entity models for EcoDeli. Every struct in this crate represents a
//! database table row or a domain value object. Status enums carry their own
//! transition tables so that services can gate every update on the current
//! status.

pub mod announcement;
pub mod audit;
pub mod bid;
pub mod booking;
pub mod delivery;
pub mod notification;
pub mod payment;
pub mod user;
