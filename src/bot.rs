use std::sync::Arc;

use chrono::Utc;
use teloxide::types::{ChatId, MessageId, ParseMode, Update};
use tracing::{debug, error, info, warn};

use crate::format;
use crate::lookup::{ArgumentError, LookupRequest, PlayerLookup};
use crate::platform::{ChatSender, DeliveryError};
use crate::update::{incoming_message, message_text};

const COMMAND_MARKER: char = '/';

/// Shared application state
pub struct AppState {
    chat: Arc<dyn ChatSender>,
    lookup: Arc<dyn PlayerLookup>,
}

impl AppState {
    pub fn new(chat: Arc<dyn ChatSender>, lookup: Arc<dyn PlayerLookup>) -> Self {
        Self { chat, lookup }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Lookup(Vec<&'a str>),
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse message text into a command. Text without the leading marker is
    /// not a command and yields `None`.
    pub fn parse(text: &'a str) -> Option<Self> {
        if !text.starts_with(COMMAND_MARKER) {
            return None;
        }

        let mut tokens = text.split_whitespace();
        let head = tokens.next()?;

        if head.starts_with("/start") || head.starts_with("/help") {
            Some(Command::Help)
        } else if head.starts_with("/get") {
            Some(Command::Lookup(tokens.collect()))
        } else {
            Some(Command::Unknown(head))
        }
    }
}

/// Process one webhook update to completion. Never fails: every outcome is
/// either a reply to the chat or a log line.
pub async fn handle_update(state: &AppState, update: Update) {
    let update_id = update.id.0;
    let Some(msg) = incoming_message(update) else {
        debug!("Update {} carries no message", update_id);
        return;
    };

    let Some(command) = Command::parse(message_text(&msg)) else {
        debug!("Update {} is not a command", update_id);
        return;
    };

    let chat_id = msg.chat.id;
    info!(
        "Command {:?} in chat {} from user {:?}",
        command,
        chat_id.0,
        msg.from.as_ref().map(|u| u.id.0)
    );

    match command {
        Command::Help => deliver(state.chat.as_ref(), chat_id, None, &format::help_text()).await,
        Command::Unknown(_) => {
            deliver(
                state.chat.as_ref(),
                chat_id,
                None,
                &format::unknown_command_text(),
            )
            .await
        }
        Command::Lookup(args) => run_lookup(state, chat_id, &args).await,
    }
}

async fn run_lookup(state: &AppState, chat_id: ChatId, args: &[&str]) {
    let request = match LookupRequest::from_args(args) {
        Ok(request) => request,
        Err(err) => {
            debug!("Rejected /get arguments in chat {}: {}", chat_id.0, err);
            let text = match err {
                ArgumentError::MissingArguments => format::usage_error_text(),
                ArgumentError::InvalidUid => format::invalid_uid_text(),
            };
            deliver(state.chat.as_ref(), chat_id, None, &text).await;
            return;
        }
    };

    let placeholder = match state
        .chat
        .send_text(chat_id, &format::placeholder_text(), Some(ParseMode::MarkdownV2))
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Failed to send placeholder to chat {}: {}", chat_id.0, e);
            None
        }
    };

    let text = match state.lookup.lookup(&request).await {
        Ok(record) => format::format_report(&record, Utc::now()),
        Err(err) => {
            if err.is_expected() {
                debug!("Lookup uid={} region={}: {}", request.uid, request.region, err);
            } else {
                warn!("Lookup uid={} region={} failed: {}", request.uid, request.region, err);
            }
            format::error_text(&err.user_message())
        }
    };

    deliver(state.chat.as_ref(), chat_id, placeholder, &text).await;
}

/// Send `text` as MarkdownV2, editing `placeholder` when there is one.
///
/// If Telegram rejects the markup the text is sent once more as plain text.
/// Any remaining failure is logged and dropped.
async fn deliver(
    chat: &dyn ChatSender,
    chat_id: ChatId,
    placeholder: Option<MessageId>,
    text: &str,
) {
    match send_or_edit(chat, chat_id, placeholder, text, Some(ParseMode::MarkdownV2)).await {
        Ok(()) => {}
        Err(DeliveryError::Markup(reason)) => {
            warn!(
                "Markup rejected for chat {} ({}), retrying as plain text",
                chat_id.0, reason
            );
            let plain = format::strip_markup(text);
            if let Err(e) = send_or_edit(chat, chat_id, placeholder, &plain, None).await {
                error!("Plain text delivery to chat {} failed: {}", chat_id.0, e);
            }
        }
        Err(e) => error!("Delivery to chat {} failed: {}", chat_id.0, e),
    }
}

async fn send_or_edit(
    chat: &dyn ChatSender,
    chat_id: ChatId,
    placeholder: Option<MessageId>,
    text: &str,
    parse_mode: Option<ParseMode>,
) -> Result<(), DeliveryError> {
    match placeholder {
        Some(message_id) => chat.edit_text(chat_id, message_id, text, parse_mode).await,
        None => chat.send_text(chat_id, text, parse_mode).await.map(|_| ()),
    }
}
