//! Payments, subscription plans and quotes.

pub mod pricing;
pub mod service;

pub use pricing::{PlanInfo, PricingService, Quote, quote};
pub use service::{PaymentInput, PaymentService};
