//! Repository implementations for the marketplace entities.

pub mod announcement;
pub mod audit;
pub mod bid;
pub mod booking;
pub mod delivery;
pub mod inbox;
pub mod payment;
pub mod preference;
pub mod stats;
pub mod user;

pub use announcement::AnnouncementRepository;
pub use audit::AuditLogRepository;
pub use bid::BidRepository;
pub use booking::BookingRepository;
pub use delivery::DeliveryRepository;
pub use inbox::InboxRepository;
pub use payment::PaymentRepository;
pub use preference::PreferenceRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;
