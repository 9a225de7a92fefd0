use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::GofileConfig;

/// Status prefix GoFile uses for failures inside a 2xx reply.
const ERROR_PREFIX: &str = "error-";

/// Provider-reported failures that get their own handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// `error-notFound`: the target folder is gone or the token is wrong
    NotFound,
}

impl ProviderErrorKind {
    fn from_status(status: &str) -> Option<Self> {
        match status {
            "error-notFound" => Some(Self::NotFound),
            _ => None,
        }
    }

    pub fn as_status(&self) -> &'static str {
        match self {
            Self::NotFound => "error-notFound",
        }
    }
}

/// A decoded GoFile reply envelope
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply<T> {
    Success {
        status: Option<String>,
        data: Option<T>,
    },
    KnownError(ProviderErrorKind),
    UnknownError(String),
}

impl<T> ProviderReply<T> {
    fn classify(status: Option<String>, data: Option<T>) -> Self {
        match status {
            Some(s) if s.starts_with(ERROR_PREFIX) => match ProviderErrorKind::from_status(&s) {
                Some(kind) => Self::KnownError(kind),
                None => Self::UnknownError(s),
            },
            status => Self::Success { status, data },
        }
    }
}

/// Result of one GoFile call, before flow-specific interpretation
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    HttpError(StatusCode),
    Undecodable,
    Reply(ProviderReply<T>),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountId {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    #[serde(default)]
    pub premium: Option<bool>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub files_count: Option<u64>,
    #[serde(default)]
    pub root_folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerList {
    #[serde(default)]
    pub servers: Vec<Server>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub name: String,
    #[serde(default)]
    pub zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[serde(default)]
    pub download_page: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
}

/// GoFile API client. Every call is authenticated with the caller's bearer token.
pub struct GofileClient {
    client: reqwest::Client,
    config: GofileConfig,
}

impl GofileClient {
    pub fn new(client: reqwest::Client, config: GofileConfig) -> Self {
        Self { client, config }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Link for a file id when the reply carries no download page.
    pub fn download_page_for(&self, file_id: &str) -> String {
        format!(
            "{}/{}",
            self.config.download_page_url.trim_end_matches('/'),
            file_id
        )
    }

    /// Resolve the account id behind a token. Also used to validate tokens.
    pub async fn account_id(&self, token: &str) -> Result<ApiOutcome<AccountId>> {
        let response = self
            .client
            .get(self.api_url("accounts/getid"))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send account id request to GoFile")?;

        read_reply(response, "account id").await
    }

    pub async fn account_details(
        &self,
        token: &str,
        account_id: &str,
    ) -> Result<ApiOutcome<AccountDetails>> {
        let response = self
            .client
            .get(self.api_url(&format!("accounts/{}", account_id)))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send account details request to GoFile")?;

        read_reply(response, "account details").await
    }

    pub async fn servers(&self, token: &str) -> Result<ApiOutcome<ServerList>> {
        let response = self
            .client
            .get(self.api_url("servers"))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send server list request to GoFile")?;

        read_reply(response, "server list").await
    }

    /// Multipart upload of a buffered file to `server`.
    pub async fn upload(
        &self,
        token: &str,
        server: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<ApiOutcome<UploadedFile>> {
        let url = self.config.upload_url.replace("{server}", server);
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name.to_string()));

        debug!("Uploading {} to {}", file_name, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request to GoFile")?;

        read_reply(response, "upload").await
    }
}

/// Read the raw body, then classify by HTTP status and envelope status.
async fn read_reply<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<ApiOutcome<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read GoFile {} response", what))?;

    debug!("GoFile {} response ({}): {}", what, status, body);

    if !status.is_success() {
        error!("GoFile {} request failed ({}): {}", what, status, body);
        return Ok(ApiOutcome::HttpError(status));
    }

    match serde_json::from_str::<Envelope<T>>(&body) {
        Ok(envelope) => Ok(ApiOutcome::Reply(ProviderReply::classify(
            envelope.status,
            envelope.data,
        ))),
        Err(e) => {
            error!("Failed to parse GoFile {} response: {}", what, e);
            Ok(ApiOutcome::Undecodable)
        }
    }
}
