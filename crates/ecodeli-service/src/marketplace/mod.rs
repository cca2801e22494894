//! Marketplace lifecycles: announcements and bids, deliveries, bookings.

pub mod announcement;
pub mod booking;
pub mod delivery;

pub use announcement::{AnnouncementInput, AnnouncementService, CancelOutcome, validation_code};
pub use booking::{BookingInput, BookingService};
pub use delivery::DeliveryService;
