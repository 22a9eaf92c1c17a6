use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::error::NotifyError;
use crate::notifier::Notifier;

/// Sends plain-text messages through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }

    pub fn with_api_url(mut self, url: reqwest::Url) -> Self {
        self.bot = self.bot.set_api_url(url);
        self
    }
}

pub fn recipient(chat_id: &str) -> Result<Recipient, NotifyError> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.len() > 1 && chat_id.starts_with('@') {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(NotifyError::InvalidChat(chat_id.to_string()))
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let to = recipient(chat_id)?;
        match self.bot.send_message(to, text).await {
            Ok(msg) => {
                debug!("Sent message to chat {} (msg_id={})", chat_id, msg.id.0);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send message to chat {}: {}", chat_id, e);
                Err(e.into())
            }
        }
    }
}
