//! HTTP adapters for third-party push, email and SMS providers.
//!
//! Every adapter POSTs a JSON document to its configured endpoint with the
//! API key as a bearer token. Anything but a 2xx answer is a failure.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use ecodeli_core::config::channel::ChannelEndpointConfig;
use ecodeli_core::error::{AppError, ErrorKind};
use ecodeli_core::result::AppResult;
use ecodeli_entity::notification::NotificationChannel;

use crate::message::OutboundMessage;
use crate::sender::ChannelSender;

/// A configured provider endpoint.
#[derive(Debug, Clone)]
struct ProviderEndpoint {
    client: reqwest::Client,
    url: String,
    api_key: String,
    sender: String,
}

impl ProviderEndpoint {
    fn from_config(
        channel: NotificationChannel,
        config: &ChannelEndpointConfig,
    ) -> AppResult<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(AppError::configuration(format!(
                "Channel '{channel}' is enabled but has no endpoint"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client for '{channel}'"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            url: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
        })
    }

    async fn post(
        &self,
        channel: NotificationChannel,
        payload: serde_json::Value,
    ) -> AppResult<()> {
        let mut request = self.client.post(&self.url).json(&payload);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("{channel} provider unreachable"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::external(format!(
                "{channel} provider returned {status}: {}",
                truncate(&body, 200)
            )))
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Push notifications through a push provider.
#[derive(Debug, Clone)]
pub struct HttpPushSender {
    endpoint: ProviderEndpoint,
}

impl HttpPushSender {
    /// Build the sender from its endpoint configuration.
    pub fn new(config: &ChannelEndpointConfig) -> AppResult<Self> {
        Ok(Self {
            endpoint: ProviderEndpoint::from_config(NotificationChannel::Push, config)?,
        })
    }
}

#[async_trait]
impl ChannelSender for HttpPushSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Push
    }

    async fn send(&self, message: &OutboundMessage) -> AppResult<()> {
        let token = message
            .recipient
            .push_token
            .as_deref()
            .ok_or_else(|| AppError::external("Recipient has no push token"))?;

        let payload = json!({
            "to": token,
            "title": message.title,
            "body": message.body,
            "priority": message.priority,
            "data": {
                "notification_id": message.notification_id,
                "kind": message.kind,
                "entity_id": message.entity_id,
            },
        });
        self.endpoint.post(self.channel(), payload).await
    }
}

/// Transactional email through an email provider.
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    endpoint: ProviderEndpoint,
}

impl HttpEmailSender {
    /// Build the sender from its endpoint configuration.
    pub fn new(config: &ChannelEndpointConfig) -> AppResult<Self> {
        Ok(Self {
            endpoint: ProviderEndpoint::from_config(NotificationChannel::Email, config)?,
        })
    }
}

#[async_trait]
impl ChannelSender for HttpEmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, message: &OutboundMessage) -> AppResult<()> {
        let payload = json!({
            "from": self.endpoint.sender,
            "to": message.recipient.email,
            "to_name": message.recipient.name,
            "subject": message.title,
            "text": message.body,
        });
        self.endpoint.post(self.channel(), payload).await
    }
}

/// Text messages through an SMS gateway.
#[derive(Debug, Clone)]
pub struct HttpSmsSender {
    endpoint: ProviderEndpoint,
}

impl HttpSmsSender {
    /// Build the sender from its endpoint configuration.
    pub fn new(config: &ChannelEndpointConfig) -> AppResult<Self> {
        Ok(Self {
            endpoint: ProviderEndpoint::from_config(NotificationChannel::Sms, config)?,
        })
    }
}

#[async_trait]
impl ChannelSender for HttpSmsSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Sms
    }

    async fn send(&self, message: &OutboundMessage) -> AppResult<()> {
        let phone = message
            .recipient
            .phone
            .as_deref()
            .ok_or_else(|| AppError::external("Recipient has no phone number"))?;

        let payload = json!({
            "from": self.endpoint.sender,
            "to": phone,
            "text": format!("{}: {}", message.title, message.body),
        });
        self.endpoint.post(self.channel(), payload).await
    }
}
