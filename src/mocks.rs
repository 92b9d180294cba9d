//! In-process stand-ins for Telegram and the lookup API.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use teloxide::types::{ChatId, MessageId, ParseMode};

use crate::lookup::{LookupError, LookupRequest, PlayerLookup};
use crate::platform::{ChatSender, DeliveryError};
use crate::player::PlayerRecord;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A Telegram webhook payload for a private text message from user 42.
pub fn text_update(chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "date": 1700000000,
            "chat": { "id": chat_id, "type": "private", "first_name": "Ana" },
            "from": { "id": 42, "is_bot": false, "first_name": "Ana" },
            "text": text
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    New {
        chat_id: i64,
        text: String,
        markdown: bool,
    },
    Edit {
        chat_id: i64,
        message_id: i32,
        text: String,
        markdown: bool,
    },
}

impl Sent {
    pub fn text(&self) -> &str {
        match self {
            Sent::New { text, .. } | Sent::Edit { text, .. } => text,
        }
    }
}

/// Records every successful send and edit.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    /// Number of leading `send_text` calls that fail with a request error.
    failing_sends: AtomicUsize,
    reject_markdown: bool,
}

impl RecordingSender {
    pub fn failing_sends(count: usize) -> Self {
        Self {
            failing_sends: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    pub fn rejecting_markdown() -> Self {
        Self {
            reject_markdown: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().iter().map(|s| s.text().to_string()).collect()
    }

    fn check_markup(&self, markdown: bool) -> Result<(), DeliveryError> {
        if self.reject_markdown && markdown {
            return Err(DeliveryError::Markup(
                "can't parse entities: character '.' is reserved".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, DeliveryError> {
        let failing = self
            .failing_sends
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DeliveryError::Request("network down".to_string()));
        }
        let markdown = parse_mode.is_some();
        self.check_markup(markdown)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().unwrap().push(Sent::New {
            chat_id: chat_id.0,
            text: text.to_string(),
            markdown,
        });
        Ok(MessageId(id))
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), DeliveryError> {
        let markdown = parse_mode.is_some();
        self.check_markup(markdown)?;
        self.sent.lock().unwrap().push(Sent::Edit {
            chat_id: chat_id.0,
            message_id: message_id.0,
            text: text.to_string(),
            markdown,
        });
        Ok(())
    }
}

enum Reply {
    Body(Value),
    Error(fn() -> LookupError),
}

/// Canned lookup results that count how often they were asked.
pub struct StubLookup {
    reply: Reply,
    calls: AtomicUsize,
    last: Mutex<Option<LookupRequest>>,
}

impl StubLookup {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Answer every lookup as if the API returned `body` with status 200.
    pub fn body(body: Value) -> Self {
        Self::new(Reply::Body(body))
    }

    pub fn error(make: fn() -> LookupError) -> Self {
        Self::new(Reply::Error(make))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<LookupRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlayerLookup for StubLookup {
    async fn lookup(&self, request: &LookupRequest) -> Result<PlayerRecord, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Reply::Body(body) => PlayerRecord::from_value(body.clone()),
            Reply::Error(make) => Err(make()),
        }
    }
}
