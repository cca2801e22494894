//! A sender with pre-scripted outcomes, used to drive the runner without a
//! network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_entity::notification::NotificationChannel;

use crate::message::OutboundMessage;
use crate::sender::ChannelSender;

/// Replays scripted outcomes and records every message it was given.
#[derive(Debug)]
pub struct ScriptedSender {
    channel: NotificationChannel,
    outcomes: Mutex<VecDeque<bool>>,
    fallback: bool,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl ScriptedSender {
    /// A sender that always succeeds.
    pub fn succeeding(channel: NotificationChannel) -> Self {
        Self::new(channel, true)
    }

    /// A sender that always fails.
    pub fn failing(channel: NotificationChannel) -> Self {
        Self::new(channel, false)
    }

    fn new(channel: NotificationChannel, fallback: bool) -> Self {
        Self {
            channel,
            outcomes: Mutex::new(VecDeque::new()),
            fallback,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queue outcomes consumed before the fallback applies.
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        if let Ok(mut queue) = self.outcomes.lock() {
            queue.extend(outcomes);
        }
        self
    }

    /// Messages attempted so far, successful or not.
    pub fn attempts(&self) -> Vec<OutboundMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChannelSender for ScriptedSender {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn send(&self, message: &OutboundMessage) -> AppResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        let ok = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(self.fallback);

        if ok {
            Ok(())
        } else {
            Err(AppError::external(format!("{} provider rejected the message", self.channel)))
        }
    }
}
