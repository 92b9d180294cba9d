use teloxide::types::{Message, Update, UpdateKind};

/// The message a webhook update carries, if the bot should look at it.
///
/// New messages and edits are both handled; every other update kind (and any
/// payload teloxide could not fully parse) is ignored.
pub fn incoming_message(update: Update) -> Option<Message> {
    match update.kind {
        UpdateKind::Message(msg) | UpdateKind::EditedMessage(msg) => Some(msg),
        _ => None,
    }
}

/// Text of a message, or an empty string for media and service messages.
pub fn message_text(msg: &Message) -> &str {
    msg.text().unwrap_or_default()
}
