use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::config::{Config, ServerConfig};
use crate::gofile::GofileClient;
use crate::platform::telegram::TelegramClient;
use crate::platform::{IncomingMessage, Update};
use crate::store::TokenStore;
use crate::upload;

const HELP_PROMPT: &str = "📁 Send a file or use /help";

/// Shared application state
pub struct AppState {
    pub telegram: TelegramClient,
    pub gofile: GofileClient,
    pub tokens: Arc<dyn TokenStore>,
    pub progress_notices: bool,
}

impl AppState {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Self {
        let client = reqwest::Client::new();
        Self {
            telegram: TelegramClient::new(client.clone(), config.telegram.clone()),
            gofile: GofileClient::new(client, config.gofile.clone()),
            tokens,
            progress_notices: config.upload.progress_notices,
        }
    }
}

/// Build the HTTP routes: the webhook (any method) and a health probe.
pub fn router(state: Arc<AppState>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, any(webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the webhook until Ctrl-C
pub async fn run(state: Arc<AppState>, server: &ServerConfig) -> Result<()> {
    let app = router(state, &server.webhook_path);

    let listener = TcpListener::bind(&server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", server.listen_addr))?;

    info!(
        "Webhook listening on {}{}",
        server.listen_addr, server.webhook_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server exited with error")?;

    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> (StatusCode, &'static str) {
    handle_update(&state, &method, &body).await
}

/// Validate, parse and dispatch one inbound update.
///
/// Always yields a definite status: 405 for non-POST, 500 for a body
/// that is not JSON, 200 otherwise.
pub async fn handle_update(
    state: &AppState,
    method: &Method,
    body: &[u8],
) -> (StatusCode, &'static str) {
    if *method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }

    let update: Update = match serde_json::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            error!("Failed to parse update: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server Error");
        }
    };

    let Some(raw) = update.message else {
        return (StatusCode::OK, "OK");
    };

    let message: IncomingMessage = match serde_json::from_value(raw) {
        Ok(message) => message,
        Err(e) => {
            warn!("Ignoring message without a usable chat: {}", e);
            return (StatusCode::OK, "OK");
        }
    };

    dispatch(state, message).await;
    (StatusCode::OK, "OK")
}

async fn dispatch(state: &AppState, message: IncomingMessage) {
    let chat_id = message.chat.id;

    if let Some(text) = message.text.as_deref().filter(|t| t.starts_with('/')) {
        debug!("Command from chat {}: {}", chat_id.0, text);
        commands::handle(state, chat_id, text).await;
        return;
    }

    if let Some(document) = message.document {
        debug!("Document {} from chat {}", document.file_id, chat_id.0);
        upload::handle(state, chat_id, &document).await;
        return;
    }

    state.telegram.send_message(chat_id, HELP_PROMPT).await;
}
