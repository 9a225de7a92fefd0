mod bot;
mod commands;
mod config;
mod format;
mod gofile;
mod platform;
mod store;
mod upload;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;
use crate::store::SqliteTokenStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gofile_relay=debug".into()),
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
    info!("  Telegram API: {}", config.telegram.api_url);
    info!("  GoFile API: {}", config.gofile.api_url);
    info!("  Token store: {}", config.store.database_path.display());
    info!("  Progress notices: {}", config.upload.progress_notices);

    let tokens = SqliteTokenStore::open(&config.store.database_path)?;

    // Create shared state
    let state = Arc::new(AppState::new(&config, Arc::new(tokens)));

    info!("Relay is starting...");
    bot::run(state, &config.server).await?;

    Ok(())
}
