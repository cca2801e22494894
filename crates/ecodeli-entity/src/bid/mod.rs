//! Bid (match proposal) entities.

pub mod model;

pub use model::{Bid, BidStatus, CreateBid};
