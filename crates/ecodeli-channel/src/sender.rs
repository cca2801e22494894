//! The channel abstraction.

use async_trait::async_trait;

use ecodeli_core::result::AppResult;
use ecodeli_entity::notification::NotificationChannel;

use crate::message::OutboundMessage;

/// A single outbound delivery channel.
///
/// `send` returns `Ok(())` only once the provider accepted the message.
/// Transport errors, timeouts and non-2xx responses are
/// [`ErrorKind::ExternalService`](ecodeli_core::error::ErrorKind::ExternalService)
/// errors.
#[async_trait]
pub trait ChannelSender: Send + Sync + std::fmt::Debug {
    /// The channel this sender serves.
    fn channel(&self) -> NotificationChannel;

    /// Deliver one message.
    async fn send(&self, message: &OutboundMessage) -> AppResult<()>;
}
