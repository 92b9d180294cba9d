use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use teloxide::types::Update;
use tracing::{info, warn};

use crate::bot::{self, AppState};
use crate::config::ServerConfig;

#[derive(Serialize)]
struct Ack {
    ok: bool,
}

pub fn router(state: Arc<AppState>, webhook_path: &str) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route(webhook_path, post(webhook))
        .with_state(state)
}

/// Serve the webhook until Ctrl-C.
pub async fn run(state: Arc<AppState>, config: &ServerConfig) -> Result<()> {
    let app = router(state, &config.webhook_path);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Listening on {} (webhook at {})", addr, config.webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    Ok(())
}

// Telegram retries any non-2xx response, so the update is acknowledged
// whatever happens while handling it.
async fn webhook(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Ack> {
    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => bot::handle_update(&state, update).await,
        Err(e) => warn!("Ignoring malformed update ({} bytes): {}", body.len(), e),
    }
    Json(Ack { ok: true })
}

async fn status() -> Json<Value> {
    Json(json!({
        "status": "running",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

async fn health() -> Json<Ack> {
    Json(Ack { ok: true })
}
