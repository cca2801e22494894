//! # ecodeli-channel
//!
//! Outbound delivery channels for scheduled notifications.
//!
//! Each channel is a [`ChannelSender`]: a direct call to a third-party
//! provider with a timeout. The [`ChannelRegistry`] holds the senders that
//! are enabled in configuration.

pub mod http;
pub mod message;
pub mod registry;
pub mod scripted;
pub mod sender;

pub use http::{HttpEmailSender, HttpPushSender, HttpSmsSender};
pub use message::{OutboundMessage, Recipient};
pub use registry::ChannelRegistry;
pub use scripted::ScriptedSender;
pub use sender::ChannelSender;
