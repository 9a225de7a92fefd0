//! Document upload pipeline: Telegram file -> GoFile.
//!
//! Each step either yields the input for the next one or an [`UploadError`];
//! the first failure ends the pipeline and becomes the single reply.

use reqwest::StatusCode;
use teloxide::types::ChatId;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::bot::AppState;
use crate::commands::MISSING_TOKEN_TEXT;
use crate::format::{escape_markdown, format_bytes};
use crate::gofile::{ApiOutcome, ProviderErrorKind, ProviderReply, UploadedFile};
use crate::platform::telegram::FileLocation;
use crate::platform::Document;
use crate::store::token_key;

/// Largest declared document size accepted: 25 MiB.
pub const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

const FALLBACK_FILE_NAME: &str = "file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("declared size {0} exceeds the limit")]
    TooLarge(u64),
    #[error("no token stored")]
    MissingToken,
    #[error("telegram getFile request failed")]
    FileInfoUnreachable,
    #[error("telegram returned no file path")]
    FileUnavailable,
    #[error("gofile server list request failed")]
    ServerListUnavailable,
    #[error("gofile returned no servers")]
    NoServers,
    #[error("file download from telegram failed")]
    FetchFailed,
    #[error("upload rejected with HTTP {0}")]
    UploadRejected(StatusCode),
    #[error("upload reply was not valid JSON")]
    InvalidResponse,
    #[error("upload target folder not found")]
    FolderNotFound,
    #[error("gofile reported {0}")]
    Provider(String),
    #[error("upload reply had no data (status {0:?})")]
    MissingData(Option<String>),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            Self::TooLarge(_) => "❌ File exceeds the 25MB limit".to_string(),
            Self::MissingToken => MISSING_TOKEN_TEXT.to_string(),
            Self::FileInfoUnreachable => {
                "❌ Failed to get file information from Telegram".to_string()
            }
            Self::FileUnavailable => "❌ File is not available on Telegram servers".to_string(),
            Self::ServerListUnavailable => "❌ Failed to get a GoFile server".to_string(),
            Self::NoServers => "❌ No GoFile server is available right now".to_string(),
            Self::FetchFailed => "❌ Failed to fetch the file from Telegram".to_string(),
            Self::UploadRejected(status) => {
                format!("❌ Upload failed. Status: {}", status.as_u16())
            }
            Self::InvalidResponse => "❌ Invalid response from GoFile".to_string(),
            Self::FolderNotFound => "❌ Error: folder not found. \
                The token may be invalid or the folder was deleted."
                .to_string(),
            Self::Provider(status) => format!("❌ GoFile API Error: {}", status),
            Self::MissingData(status) => format!(
                "❌ Upload failed: {}",
                status.as_deref().unwrap_or("unknown error")
            ),
            Self::Unexpected(_) => {
                "❌ Something went wrong during the upload. The error has been logged.".to_string()
            }
        }
    }
}

/// Upload a document for a chat and send the outcome as one message.
pub async fn handle(state: &AppState, chat_id: ChatId, document: &Document) {
    let reply = match run(state, chat_id, document).await {
        Ok(text) => text,
        Err(e) => {
            error!("Upload failed for chat {}: {:#}", chat_id.0, e);
            e.user_message()
        }
    };

    state.telegram.send_message(chat_id, &reply).await;
}

async fn run(
    state: &AppState,
    chat_id: ChatId,
    document: &Document,
) -> Result<String, UploadError> {
    check_size(document)?;
    notice(state, chat_id, "⏳ Processing file...").await;

    let token = stored_token(state, chat_id).await?;
    let source_url = resolve_source(state, &document.file_id).await?;

    notice(state, chat_id, "🔍 Finding the best GoFile server...").await;
    let server = select_server(state, &token).await?;
    notice(state, chat_id, &format!("🔄 Uploading to server {}...", server)).await;

    let content = fetch_bytes(state, &source_url).await?;
    let file_name = document.file_name.as_deref().unwrap_or(FALLBACK_FILE_NAME);
    let outcome = state
        .gofile
        .upload(&token, &server, file_name, content)
        .await?;
    let uploaded = interpret(outcome)?;

    info!("Chat {} uploaded {} to {}", chat_id.0, file_name, server);
    Ok(success_message(state, document, uploaded))
}

/// Progress message, only when enabled in config.
async fn notice(state: &AppState, chat_id: ChatId, text: &str) {
    if state.progress_notices {
        state.telegram.send_message(chat_id, text).await;
    }
}

fn check_size(document: &Document) -> Result<(), UploadError> {
    match document.file_size {
        Some(size) if size > MAX_FILE_SIZE => Err(UploadError::TooLarge(size)),
        _ => Ok(()),
    }
}

async fn stored_token(state: &AppState, chat_id: ChatId) -> Result<String, UploadError> {
    state
        .tokens
        .get(&token_key(chat_id))
        .await?
        .ok_or(UploadError::MissingToken)
}

async fn resolve_source(state: &AppState, file_id: &str) -> Result<String, UploadError> {
    match state.telegram.resolve_file_url(file_id).await? {
        FileLocation::Url(url) => Ok(url),
        FileLocation::Unreachable => Err(UploadError::FileInfoUnreachable),
        FileLocation::Unavailable => Err(UploadError::FileUnavailable),
    }
}

/// First server in GoFile's list.
async fn select_server(state: &AppState, token: &str) -> Result<String, UploadError> {
    let list = match state.gofile.servers(token).await? {
        ApiOutcome::HttpError(_) => return Err(UploadError::ServerListUnavailable),
        ApiOutcome::Undecodable => {
            return Err(anyhow::anyhow!("undecodable server list reply").into())
        }
        ApiOutcome::Reply(ProviderReply::Success { data, .. }) => data,
        ApiOutcome::Reply(_) => None,
    };

    let server = list
        .and_then(|l| l.servers.into_iter().next())
        .ok_or(UploadError::NoServers)?;
    debug!("Selected server {} (zone {:?})", server.name, server.zone);
    Ok(server.name)
}

async fn fetch_bytes(state: &AppState, url: &str) -> Result<Vec<u8>, UploadError> {
    state
        .telegram
        .download(url)
        .await?
        .ok_or(UploadError::FetchFailed)
}

fn interpret(outcome: ApiOutcome<UploadedFile>) -> Result<UploadedFile, UploadError> {
    match outcome {
        ApiOutcome::HttpError(status) => Err(UploadError::UploadRejected(status)),
        ApiOutcome::Undecodable => Err(UploadError::InvalidResponse),
        ApiOutcome::Reply(ProviderReply::KnownError(ProviderErrorKind::NotFound)) => {
            Err(UploadError::FolderNotFound)
        }
        ApiOutcome::Reply(ProviderReply::UnknownError(status)) => {
            Err(UploadError::Provider(status))
        }
        ApiOutcome::Reply(ProviderReply::Success { status, data }) => {
            data.ok_or(UploadError::MissingData(status))
        }
    }
}

fn success_message(state: &AppState, document: &Document, uploaded: UploadedFile) -> String {
    let link = uploaded
        .download_page
        .filter(|page| !page.is_empty())
        .or_else(|| {
            uploaded
                .file_id
                .filter(|id| !id.is_empty())
                .map(|id| state.gofile.download_page_for(&id))
        });

    let Some(link) = link else {
        return "✅ File uploaded, but the download link is not available".to_string();
    };

    let name = escape_markdown(document.file_name.as_deref().unwrap_or("File"));
    let size = format_bytes(document.file_size.unwrap_or(0));

    format!(
        "✅ *Upload complete!*\n\n\
         📄 File: {}\n\
         📊 Size: {}\n\
         🔗 Link: {}",
        name, size, link
    )
}
