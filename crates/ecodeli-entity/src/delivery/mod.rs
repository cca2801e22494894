//! Delivery domain entities.

pub mod model;
pub mod status;

pub use model::Delivery;
pub use status::DeliveryStatus;
