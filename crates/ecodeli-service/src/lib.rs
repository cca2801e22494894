//! # ecodeli-service
//!
//! Business logic service layer for EcoDeli. Each service orchestrates
//! repositories, the notification scheduler and authentication to implement
//! application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod context;
pub mod marketplace;
pub mod notification;
pub mod payment;
pub mod seed;
pub mod stats;

pub use account::{AccountService, AdminAccountService};
pub use context::RequestContext;
pub use marketplace::{AnnouncementService, BookingService, DeliveryService};
pub use notification::{NotificationRunner, NotificationService, ReminderWriter};
pub use payment::{PaymentService, PricingService};
pub use seed::DemoSeeder;
pub use stats::StatsService;
