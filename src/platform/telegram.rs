use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, ParseMode};
use tracing::{debug, error, warn};

use crate::config::TelegramConfig;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: ParseMode,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct GetFileResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Option<FileInfo>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(default)]
    file_path: Option<String>,
}

/// Where a document's bytes can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLocation {
    /// getFile answered with a non-success HTTP status
    Unreachable,
    /// getFile answered but gave no usable path
    Unavailable,
    Url(String),
}

/// Bot API client: outbound messages, file lookup and file download.
pub struct TelegramClient {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, config: TelegramConfig) -> Self {
        Self { client, config }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// Send a Markdown message with link previews off.
    ///
    /// Delivery failures are logged and swallowed; callers always proceed.
    #[allow(deprecated)]
    pub async fn send_message(&self, chat_id: ChatId, text: &str) {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: ParseMode::Markdown,
            disable_web_page_preview: true,
        };

        let result = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Message sent to chat {}", chat_id.0);
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "Failed to send message to chat {} ({}): {}",
                    chat_id.0, status, body
                );
            }
            Err(e) => {
                error!(
                    "Send message error for chat {}: {:#}",
                    chat_id.0,
                    e.without_url()
                );
            }
        }
    }

    /// Resolve a file id to its download URL via getFile.
    ///
    /// Request URLs embed the bot token, so errors are stripped of them.
    pub async fn resolve_file_url(&self, file_id: &str) -> Result<FileLocation> {
        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send getFile request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Failed to get file info ({}): {}", status, body);
            return Ok(FileLocation::Unreachable);
        }

        let info: GetFileResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse getFile response")?;
        debug!(
            "getFile ok={} path={:?}",
            info.ok,
            info.result.as_ref().map(|r| &r.file_path)
        );

        let path = match info.result.and_then(|r| r.file_path) {
            Some(path) if info.ok && !path.is_empty() => path,
            _ => return Ok(FileLocation::Unavailable),
        };

        Ok(FileLocation::Url(format!(
            "{}/file/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            path
        )))
    }

    /// Fetch a file's full contents into memory. `None` on a non-success status.
    pub async fn download(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to request file from Telegram")?;

        let status = response.status();
        if !status.is_success() {
            error!("File download failed ({})", status);
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read file body from Telegram")?;
        Ok(Some(Vec::from(bytes)))
    }
}
