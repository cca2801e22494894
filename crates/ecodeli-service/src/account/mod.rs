//! Accounts: self-service and admin validation.

pub mod admin;
pub mod service;

pub use admin::{AdminAccountService, ValidationDecision};
pub use service::{AccountService, LoginResponse, RegisterRequest, initial_validation};
