use teloxide::types::ChatId;
use thiserror::Error;
use tracing::{error, info};

use crate::bot::AppState;
use crate::gofile::{AccountDetails, ApiOutcome, ProviderReply};
use crate::store::token_key;

const START_TEXT: &str = "🚀 *Gofile Upload Bot*\n\n\
    Send a file to upload it to Gofile! Files up to 25MB are supported.\n\n\
    Type /help for help.";

const HELP_TEXT: &str = "🔧 *Commands:*\n\
    /settoken [TOKEN] - Set your GoFile token\n\
    /status - Check your account\n\n\
    📤 Files up to 25MB are supported via direct upload.";

const UNKNOWN_TEXT: &str = "❌ Unknown command";
const TOKEN_SAVED_TEXT: &str = "🔑 Token saved! You can now upload files up to 25MB.";
pub(crate) const MISSING_TOKEN_TEXT: &str = "❌ Token not set! Use /settoken [YOUR_TOKEN]";

/// A recognized chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Help,
    SetToken(Option<&'a str>),
    Status,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Classify by the first whitespace-delimited token, case-insensitively.
    /// A `@BotName` suffix on the command is ignored.
    pub fn parse(text: &'a str) -> Self {
        let mut parts = text.split_whitespace();
        let head = parts.next().unwrap_or_default();
        let name = head.split('@').next().unwrap_or_default().to_lowercase();

        match name.as_str() {
            "/start" => Self::Start,
            "/help" => Self::Help,
            "/settoken" => Self::SetToken(parts.next()),
            "/status" => Self::Status,
            _ => Self::Unknown(head),
        }
    }
}

/// Run a command and reply with exactly one message.
pub async fn handle(state: &AppState, chat_id: ChatId, text: &str) {
    let reply = match Command::parse(text) {
        Command::Start => START_TEXT.to_string(),
        Command::Help => HELP_TEXT.to_string(),
        Command::SetToken(token) => match set_token(state, chat_id, token).await {
            Ok(()) => TOKEN_SAVED_TEXT.to_string(),
            Err(e) => {
                error!("Set token failed for chat {}: {:#}", chat_id.0, e);
                e.user_message()
            }
        },
        Command::Status => match account_status(state, chat_id).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Status lookup failed for chat {}: {:#}", chat_id.0, e);
                e.user_message()
            }
        },
        Command::Unknown(name) => {
            info!("Unknown command from chat {}: {}", chat_id.0, name);
            UNKNOWN_TEXT.to_string()
        }
    };

    state.telegram.send_message(chat_id, &reply).await;
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no token argument given")]
    Missing,
    #[error("token validation request was rejected")]
    Rejected,
    #[error("provider reported {0}")]
    Invalid(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl TokenError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Missing => "Format: /settoken [YOUR_TOKEN]".to_string(),
            Self::Rejected => {
                "❌ Invalid token or the GoFile server is currently unavailable".to_string()
            }
            Self::Invalid(status) => format!("❌ Invalid token: {}", status),
            Self::Unexpected(_) => "❌ Failed to validate token".to_string(),
        }
    }
}

/// Validate a token against GoFile, then store it for the chat.
async fn set_token(
    state: &AppState,
    chat_id: ChatId,
    token: Option<&str>,
) -> Result<(), TokenError> {
    let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(TokenError::Missing)?;

    match state.gofile.account_id(token).await? {
        ApiOutcome::HttpError(_) => return Err(TokenError::Rejected),
        ApiOutcome::Undecodable => {
            return Err(anyhow::anyhow!("undecodable token validation reply").into())
        }
        ApiOutcome::Reply(ProviderReply::KnownError(kind)) => {
            return Err(TokenError::Invalid(kind.as_status().to_string()))
        }
        ApiOutcome::Reply(ProviderReply::UnknownError(status)) => {
            return Err(TokenError::Invalid(status))
        }
        ApiOutcome::Reply(ProviderReply::Success { .. }) => {}
    }

    state.tokens.put(&token_key(chat_id), token).await?;
    info!("Stored GoFile token for chat {}", chat_id.0);
    Ok(())
}

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("no token stored")]
    MissingToken,
    #[error("account id lookup failed")]
    IdLookupFailed,
    #[error("account id lookup reported {0}")]
    IdLookupRejected(String),
    #[error("account id missing from reply")]
    IdMissing,
    #[error("account details lookup failed")]
    DetailLookupFailed,
    #[error("account details lookup reported {0}")]
    DetailLookupRejected(String),
    #[error("account details missing from reply")]
    DetailMissing,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl StatusError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingToken => MISSING_TOKEN_TEXT.to_string(),
            Self::IdLookupFailed => {
                "❌ Failed to get the account ID. The token may be invalid.".to_string()
            }
            Self::IdLookupRejected(status) => format!("❌ Error: {}", status),
            Self::IdMissing => "❌ Account data is not available from GoFile".to_string(),
            Self::DetailLookupFailed => "❌ Failed to get account details".to_string(),
            Self::DetailLookupRejected(status) => format!("❌ Account details error: {}", status),
            Self::DetailMissing => "❌ Account details are not available from GoFile".to_string(),
            Self::Unexpected(_) => {
                "❌ Something went wrong while checking the account status".to_string()
            }
        }
    }
}

/// Two-step lookup: token -> account id -> account details.
async fn account_status(state: &AppState, chat_id: ChatId) -> Result<String, StatusError> {
    let token = state
        .tokens
        .get(&token_key(chat_id))
        .await?
        .ok_or(StatusError::MissingToken)?;

    let account_id = match state.gofile.account_id(&token).await? {
        ApiOutcome::HttpError(_) => return Err(StatusError::IdLookupFailed),
        ApiOutcome::Undecodable => {
            return Err(anyhow::anyhow!("undecodable account id reply").into())
        }
        ApiOutcome::Reply(ProviderReply::KnownError(kind)) => {
            return Err(StatusError::IdLookupRejected(kind.as_status().to_string()))
        }
        ApiOutcome::Reply(ProviderReply::UnknownError(status)) => {
            return Err(StatusError::IdLookupRejected(status))
        }
        ApiOutcome::Reply(ProviderReply::Success { data, .. }) => data
            .and_then(|d| d.id)
            .filter(|id| !id.is_empty())
            .ok_or(StatusError::IdMissing)?,
    };

    let details = match state.gofile.account_details(&token, &account_id).await? {
        ApiOutcome::HttpError(_) => return Err(StatusError::DetailLookupFailed),
        ApiOutcome::Undecodable => {
            return Err(anyhow::anyhow!("undecodable account details reply").into())
        }
        ApiOutcome::Reply(ProviderReply::KnownError(kind)) => {
            return Err(StatusError::DetailLookupRejected(
                kind.as_status().to_string(),
            ))
        }
        ApiOutcome::Reply(ProviderReply::UnknownError(status)) => {
            return Err(StatusError::DetailLookupRejected(status))
        }
        ApiOutcome::Reply(ProviderReply::Success { data, .. }) => {
            data.ok_or(StatusError::DetailMissing)?
        }
    };

    Ok(format_account(&account_id, &details))
}

fn format_account(account_id: &str, details: &AccountDetails) -> String {
    let premium = if details.premium.unwrap_or(false) {
        "✅"
    } else {
        "❌"
    };

    format!(
        "👤 *GoFile Account Info*\n\n\
         ID: `{}`\n\
         Premium: {}\n\
         Tier: {}\n\
         File Count: {}\n\
         Root Folder: `{}`",
        account_id,
        premium,
        details.tier.as_deref().filter(|t| !t.is_empty()).unwrap_or("Standard"),
        details.files_count.unwrap_or(0),
        details.root_folder.as_deref().filter(|r| !r.is_empty()).unwrap_or("N/A"),
    )
}
