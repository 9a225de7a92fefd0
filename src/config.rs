use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default = "default_gofile_config")]
    pub gofile: GofileConfig,
    #[serde(default = "default_server_config")]
    pub server: ServerConfig,
    #[serde(default = "default_store_config")]
    pub store: StoreConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GofileConfig {
    #[serde(default = "default_gofile_api_url")]
    pub api_url: String,
    /// Upload endpoint; `{server}` is replaced with the selected server name.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Base for links synthesized from a bare file id.
    #[serde(default = "default_download_page_url")]
    pub download_page_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UploadConfig {
    /// Send intermediate "processing / finding server / uploading" messages.
    #[serde(default)]
    pub progress_notices: bool,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_gofile_api_url() -> String {
    "https://api.gofile.io".to_string()
}

fn default_upload_url() -> String {
    "https://{server}.gofile.io/contents/uploadfile".to_string()
}

fn default_download_page_url() -> String {
    "https://gofile.io/d".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("relay.db")
}

fn default_gofile_config() -> GofileConfig {
    GofileConfig {
        api_url: default_gofile_api_url(),
        upload_url: default_upload_url(),
        download_page_url: default_download_page_url(),
    }
}

fn default_server_config() -> ServerConfig {
    ServerConfig {
        listen_addr: default_listen_addr(),
        webhook_path: default_webhook_path(),
    }
}

fn default_store_config() -> StoreConfig {
    StoreConfig {
        database_path: default_db_path(),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;

        if config.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("telegram.bot_token must not be empty");
        }

        Ok(config)
    }
}
