use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::info;

use crate::platform::{ChatSender, DeliveryError};

impl From<RequestError> for DeliveryError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::CantParseEntities(reason)) => DeliveryError::Markup(reason),
            other => DeliveryError::Request(other.to_string()),
        }
    }
}

#[async_trait]
impl ChatSender for Bot {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, DeliveryError> {
        let mut request = self.send_message(chat_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        let sent = request.await?;
        Ok(sent.id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), DeliveryError> {
        let mut request = self.edit_message_text(chat_id, message_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        request.await?;
        Ok(())
    }
}

/// Point Telegram's webhook delivery at `url`.
pub async fn register_webhook(bot: &Bot, url: &str) -> Result<()> {
    let url = reqwest::Url::parse(url).with_context(|| format!("Invalid webhook URL: {url}"))?;
    bot.set_webhook(url.clone())
        .await
        .with_context(|| format!("Failed to register webhook at {url}"))?;
    info!("Webhook registered at {}", url);
    Ok(())
}
