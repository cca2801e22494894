//! Payment and subscription entities.

pub mod model;
pub mod status;
pub mod subscription;

pub use model::{CreatePayment, Payment};
pub use status::PaymentStatus;
pub use subscription::SubscriptionPlan;
