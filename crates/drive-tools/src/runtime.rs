//! Runtime for the `list_drive_files` tool.
//!
//! One invocation resolves a bearer token, issues at most one `GET` against the Drive v3 files
//! collection and collapses every outcome into a [`ListingOutcome`]. The tool entry point
//! renders that outcome to text; nothing is ever propagated to the caller as an error.

use crate::config::{DriveClientConfig, FIELDS, FILES_PATH, PAGE_SIZE};
use crate::context::StateLookup;
use crate::credentials::{AccessToken, CredentialChain};
use crate::safety::sanitize_reqwest_error;
use hyper::ext::ReasonPhrase;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "エラー: 認証トークンが見つかりません。UIで認証するか、ローカルテストの場合は環境変数を設定してください。";
pub const NO_FILES_MESSAGE: &str = "Google Driveにファイルが見つかりませんでした。";
pub const LISTING_HEADER: &str = "Google Driveのファイル一覧:";

/// Errors raised while building a [`DriveFileLister`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid baseUrl '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
    #[error("http client error: {0}")]
    Client(String),
}

/// Everything that can go wrong during one listing call.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("authentication token not found")]
    MissingCredential,
    #[error("API returned {status} {reason}")]
    HttpStatus {
        status: u16,
        reason: String,
        /// `error.message` from a JSON error body. `None` when the body was not JSON.
        api_message: Option<String>,
    },
    #[error("http transport error: {0}")]
    Transport(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    HttpStatus,
    Transport,
    Unexpected,
}

impl ListingError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Text handed back to the language model.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            Self::HttpStatus {
                api_message: Some(msg),
                ..
            } => format!("API Error: {msg}"),
            Self::HttpStatus {
                status,
                reason,
                api_message: None,
            } => format!("API Error: {status} {reason}"),
            Self::Transport(desc) => format!("APIリクエストエラー: {desc}"),
            Self::Unexpected(desc) => format!("予期せぬエラーが発生しました: {desc}"),
        }
    }
}

impl From<reqwest::Error> for ListingError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Unexpected(sanitize_reqwest_error(&value))
        } else {
            Self::Transport(sanitize_reqwest_error(&value))
        }
    }
}

/// One entry of the files collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl DriveFile {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for DriveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} (ID: {})",
            self.name.as_deref().unwrap_or("None"),
            self.id.as_deref().unwrap_or("None")
        )
    }
}

/// Result of a single invocation. Exactly one is produced per call.
#[derive(Debug)]
pub enum ListingOutcome {
    /// Non-empty, in the order returned by the API.
    Files(Vec<DriveFile>),
    Empty,
    Failed(ListingError),
}

impl ListingOutcome {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed(e) => Some(e.kind()),
            Self::Files(_) | Self::Empty => None,
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Files(files) => {
                let lines: Vec<String> = files.iter().map(ToString::to_string).collect();
                format!("{LISTING_HEADER}\n{}", lines.join("\n"))
            }
            Self::Empty => NO_FILES_MESSAGE.to_string(),
            Self::Failed(e) => e.user_message(),
        }
    }
}

impl From<Vec<DriveFile>> for ListingOutcome {
    fn from(files: Vec<DriveFile>) -> Self {
        if files.is_empty() {
            Self::Empty
        } else {
            Self::Files(files)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Option<Vec<DriveFile>>,
}

/// Lists the first page of the user's Drive root.
///
/// Cheap to clone; safe to share across tasks.
#[derive(Clone)]
pub struct DriveFileLister {
    inner: Arc<DriveFileListerInner>,
}

struct DriveFileListerInner {
    files_url: Url,
    config: DriveClientConfig,
    credentials: CredentialChain,
    client: Client,
}

impl DriveFileLister {
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client cannot be built.
    pub fn new(
        config: DriveClientConfig,
        credentials: CredentialChain,
    ) -> Result<Self, BuildError> {
        let files_url = build_files_url(&config.base_url)?;
        let client = Client::builder()
            .build()
            .map_err(|e| BuildError::Client(sanitize_reqwest_error(&e)))?;

        Ok(Self {
            inner: Arc::new(DriveFileListerInner {
                files_url,
                config,
                credentials,
                client,
            }),
        })
    }

    /// Public Drive endpoint with the platform credential chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn platform_default() -> Result<Self, BuildError> {
        Self::new(
            DriveClientConfig::default(),
            CredentialChain::platform_default(),
        )
    }

    /// Tool entry point: always returns text.
    pub async fn list_drive_files(&self, query: &str, ctx: &dyn StateLookup) -> String {
        self.list(query, ctx).await.render()
    }

    /// Structured variant of [`Self::list_drive_files`].
    ///
    /// `query` is accepted for signature compatibility and ignored; the listing always covers
    /// the Drive root.
    pub async fn list(&self, query: &str, ctx: &dyn StateLookup) -> ListingOutcome {
        debug!(tool = "list_drive_files", query_len = query.len(), "listing drive files");

        let Some(token) = self.inner.credentials.resolve(ctx) else {
            debug!(tool = "list_drive_files", "authentication token not found");
            return ListingOutcome::Failed(ListingError::MissingCredential);
        };

        match self.fetch_first_page(&token).await {
            Ok(files) => ListingOutcome::from(files),
            Err(e) => {
                warn!(tool = "list_drive_files", error = %e, "drive listing failed");
                ListingOutcome::Failed(e)
            }
        }
    }

    async fn fetch_first_page(&self, token: &AccessToken) -> Result<Vec<DriveFile>, ListingError> {
        let inner = &self.inner;
        let mut request = inner
            .client
            .get(inner.files_url.clone())
            .bearer_auth(token.secret())
            .query(&[("pageSize", PAGE_SIZE.to_string().as_str()), ("fields", FIELDS)]);
        if let Some(t) = inner.config.timeout() {
            request = request.timeout(t);
        }

        let response = request.send().await?;
        let status = response.status();
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .and_then(|r| std::str::from_utf8(r.as_bytes()).ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(http_status_error(status, reason.as_deref(), &bytes));
        }

        let parsed: FileListResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ListingError::Unexpected(format!("invalid listing response: {e}")))?;
        if parsed.next_page_token.is_some() {
            debug!(tool = "list_drive_files", "more results available; only the first page is read");
        }
        Ok(parsed.files.unwrap_or_default())
    }
}

impl fmt::Debug for DriveFileLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveFileLister")
            .field("files_url", &self.inner.files_url.as_str())
            .field("credentials", &self.inner.credentials)
            .finish_non_exhaustive()
    }
}

fn build_files_url(base_url: &str) -> Result<Url, BuildError> {
    let raw = format!("{}{FILES_PATH}", base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| BuildError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// `reason` is the phrase from the status line; hyper only reports it when it is not the
/// canonical one.
fn http_status_error(status: StatusCode, reason: Option<&str>, body: &[u8]) -> ListingError {
    let reason = reason
        .or_else(|| status.canonical_reason())
        .unwrap_or("Unknown")
        .to_string();
    let api_message = match serde_json::from_slice::<Value>(body) {
        Ok(json) => {
            debug!(status = status.as_u16(), body = %json, "json error from drive api");
            Some(match json.get("error").and_then(|e| e.get("message")) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "Unknown error".to_string(),
            })
        }
        Err(_) => {
            debug!(
                status = status.as_u16(),
                body = %String::from_utf8_lossy(body),
                "non-json error from drive api"
            );
            None
        }
    };
    ListingError::HttpStatus {
        status: status.as_u16(),
        reason,
        api_message,
    }
}
