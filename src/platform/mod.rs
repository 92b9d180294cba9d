pub mod telegram;

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId, ParseMode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The platform rejected the text as invalid for the requested parse mode.
    #[error("markup rejected: {0}")]
    Markup(String),
    #[error("request failed: {0}")]
    Request(String),
}

/// Outbound side of a chat platform: the two calls the bot needs.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, DeliveryError>;

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), DeliveryError>;
}
