//! Announcement domain entities.

pub mod model;
pub mod status;

pub use model::{Announcement, AnnouncementKind, CreateAnnouncement};
pub use status::AnnouncementStatus;
