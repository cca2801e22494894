//! Push, email and SMS provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for every outbound channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Push-notification provider.
    #[serde(default)]
    pub push: ChannelEndpointConfig,
    /// Transactional email provider.
    #[serde(default)]
    pub email: ChannelEndpointConfig,
    /// SMS gateway.
    #[serde(default)]
    pub sms: ChannelEndpointConfig,
}

/// HTTP endpoint of a third-party channel provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEndpointConfig {
    /// Whether the channel is wired up. A disabled channel is skipped.
    #[serde(default)]
    pub enabled: bool,
    /// Provider endpoint receiving a JSON POST.
    #[serde(default)]
    pub endpoint: String,
    /// Bearer token sent in the `Authorization` header.
    #[serde(default)]
    pub api_key: String,
    /// Sender identity (email address or SMS sender id).
    #[serde(default)]
    pub sender: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ChannelEndpointConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: String::new(),
            sender: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
