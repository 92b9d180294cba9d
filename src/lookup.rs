use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::LookupConfig;
use crate::player::PlayerRecord;

/// Why `/get` arguments were rejected before any request was made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("expected a region and a UID")]
    MissingArguments,
    #[error("UID must contain digits only")]
    InvalidUid,
}

/// Validated arguments of a `/get` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub region: String,
    pub uid: String,
}

impl LookupRequest {
    /// Build a request from the tokens following the command.
    ///
    /// Extra tokens after the UID are ignored. The region is lower-cased and
    /// otherwise passed through unchecked.
    pub fn from_args(args: &[&str]) -> Result<Self, ArgumentError> {
        let (region, uid) = match args {
            [region, uid, ..] => (*region, *uid),
            _ => return Err(ArgumentError::MissingArguments),
        };

        if uid.is_empty() || !uid.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArgumentError::InvalidUid);
        }

        Ok(Self {
            region: region.to_lowercase(),
            uid: uid.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed")]
    Connection,
    #[error("player not found")]
    NotFound,
    #[error("lookup API returned {0}")]
    Status(StatusCode),
    #[error("invalid response format")]
    InvalidFormat,
    #[error("request failed: {0}")]
    Request(String),
}

impl LookupError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::Timeout => "❌ Request timeout, try again.".to_string(),
            LookupError::Connection => "❌ Connection error.".to_string(),
            LookupError::NotFound => "❌ No player found for this UID.".to_string(),
            LookupError::Status(status) => format!("❌ API Error: {}", status.as_u16()),
            LookupError::InvalidFormat => "❌ Invalid response format.".to_string(),
            LookupError::Request(_) => "❌ Request failed, try again later.".to_string(),
        }
    }

    /// Whether the failure is an expected outcome rather than a fault worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(self, LookupError::NotFound)
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_connect() {
            LookupError::Connection
        } else if err.is_decode() {
            LookupError::InvalidFormat
        } else {
            LookupError::Request(err.to_string())
        }
    }
}

#[async_trait]
pub trait PlayerLookup: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> Result<PlayerRecord, LookupError>;
}

/// Client for the Free Fire account info API.
pub struct FreeFireClient {
    client: reqwest::Client,
    base_url: String,
}

impl FreeFireClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build lookup HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl PlayerLookup for FreeFireClient {
    async fn lookup(&self, request: &LookupRequest) -> Result<PlayerRecord, LookupError> {
        debug!(
            "Looking up uid={} region={} via {}",
            request.uid, request.region, self.base_url
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("uid", request.uid.as_str()), ("region", request.region.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.bytes().await?;
        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|_| LookupError::InvalidFormat)?;

        PlayerRecord::from_value(value)
    }
}
