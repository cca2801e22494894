//! The set of channel senders available to the runner.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ecodeli_core::config::ChannelsConfig;
use ecodeli_core::result::AppResult;
use ecodeli_entity::notification::NotificationChannel;

use crate::http::{HttpEmailSender, HttpPushSender, HttpSmsSender};
use crate::sender::ChannelSender;

/// Enabled channel senders keyed by channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    senders: HashMap<NotificationChannel, Arc<dyn ChannelSender>>,
    send_budget: Duration,
}

impl ChannelRegistry {
    /// An empty registry; every delivery is in-app only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP senders for every enabled channel.
    pub fn from_config(config: &ChannelsConfig) -> AppResult<Self> {
        let mut registry = Self::new();
        for endpoint in [&config.push, &config.email, &config.sms] {
            if endpoint.enabled {
                registry.send_budget += Duration::from_secs(endpoint.timeout_seconds);
            }
        }
        if config.push.enabled {
            registry = registry.with_sender(Arc::new(HttpPushSender::new(&config.push)?));
        }
        if config.email.enabled {
            registry = registry.with_sender(Arc::new(HttpEmailSender::new(&config.email)?));
        }
        if config.sms.enabled {
            registry = registry.with_sender(Arc::new(HttpSmsSender::new(&config.sms)?));
        }

        tracing::info!(
            channels = ?registry.enabled_channels(),
            "Notification channels configured"
        );
        Ok(registry)
    }

    /// Register a sender, replacing any sender for the same channel.
    pub fn with_sender(mut self, sender: Arc<dyn ChannelSender>) -> Self {
        self.senders.insert(sender.channel(), sender);
        self
    }

    /// The sender for a channel, if enabled.
    pub fn get(&self, channel: NotificationChannel) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.get(&channel)
    }

    /// Longest time one message can spend across every configured channel
    /// when each of them times out.
    pub fn send_budget(&self) -> Duration {
        self.send_budget
    }

    /// Enabled channels in a stable order.
    pub fn enabled_channels(&self) -> Vec<NotificationChannel> {
        [
            NotificationChannel::Push,
            NotificationChannel::Email,
            NotificationChannel::Sms,
        ]
        .into_iter()
        .filter(|c| self.senders.contains_key(c))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecodeli_core::config::channel::ChannelEndpointConfig;

    #[test]
    fn test_disabled_channels_are_skipped() {
        let registry = ChannelRegistry::from_config(&ChannelsConfig::default()).unwrap();
        assert!(registry.enabled_channels().is_empty());
    }

    #[test]
    fn test_enabled_channel_is_registered() {
        let config = ChannelsConfig {
            email: ChannelEndpointConfig {
                enabled: true,
                endpoint: "http://localhost:9000/email".to_string(),
                ..ChannelEndpointConfig::default()
            },
            ..ChannelsConfig::default()
        };
        let registry = ChannelRegistry::from_config(&config).unwrap();
        assert_eq!(registry.enabled_channels(), vec![NotificationChannel::Email]);
        assert!(registry.get(NotificationChannel::Sms).is_none());
        assert_eq!(
            registry.send_budget(),
            Duration::from_secs(config.email.timeout_seconds)
        );
    }
}
