//! User domain entities.

pub mod model;
pub mod role;
pub mod validation;

pub use model::{CreateUser, User};
pub use role::UserRole;
pub use validation::ValidationStatus;
