mod bot;
mod config;
mod format;
mod lookup;
#[cfg(test)]
mod mocks;
mod platform;
mod player;
mod server;
mod update;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;
use crate::lookup::FreeFireClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ffinfo_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Lookup API: {}", config.lookup.base_url);
    info!("  Lookup timeout: {}s", config.lookup.timeout_secs);
    info!("  Webhook path: {}", config.server.webhook_path);

    let bot = teloxide::Bot::new(&config.telegram.bot_token);
    if let Some(url) = &config.telegram.webhook_url {
        platform::telegram::register_webhook(&bot, url).await?;
    }

    let lookup = FreeFireClient::new(&config.lookup)?;
    let state = Arc::new(AppState::new(Arc::new(bot), Arc::new(lookup)));

    info!("Bot is starting...");
    server::run(state, &config.server).await?;

    Ok(())
}
