//! # ecodeli-auth
//!
//! Authentication and authorization primitives for EcoDeli.
//!
//! ## Modules
//!
//! - `jwt` — access token creation and validation
//! - `password` — Argon2id password hashing and policy enforcement
//! - `rbac` — role checks for marketplace and admin operations

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::RbacEnforcer;
