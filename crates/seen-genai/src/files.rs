//! Provider file-staging API
//!
//! Large media is staged to provider storage and referenced by URI in the
//! generation call. A staged file is a liability (storage cost, provider
//! quota) until deleted; callers own exactly-once deletion regardless of
//! verification outcome.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{ProviderError, ProviderResult};

const HTTP_TIMEOUT_SECS: u64 = 120;

/// Processing state of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

/// An opaque handle to a staged file, valid until explicitly deleted.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    /// Provider-side resource name (e.g. "files/abc123"), used for
    /// status polls and deletion.
    pub name: String,
    /// URI passed by reference into the generation call.
    pub uri: String,
    pub state: FileState,
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: RemoteFile,
}

/// Trait for the provider file-staging capability.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Upload raw bytes; the returned file usually starts in `Processing`.
    async fn stage(&self, data: Vec<u8>, mime_type: &str) -> ProviderResult<RemoteFile>;

    /// Current processing state of a staged file.
    async fn get_state(&self, name: &str) -> ProviderResult<FileState>;

    /// Delete a staged file from provider storage.
    async fn delete(&self, name: &str) -> ProviderResult<()>;
}

/// HTTP client for the provider's file-staging endpoints.
#[derive(Clone)]
pub struct GenaiFileStore {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl Debug for GenaiFileStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GenaiFileStore").finish()
    }
}

impl GenaiFileStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ProviderResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn error_from(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ProviderError::Status { status, body }
    }
}

#[async_trait]
impl FileStore for GenaiFileStore {
    async fn stage(&self, data: Vec<u8>, mime_type: &str) -> ProviderResult<RemoteFile> {
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        let response = self
            .http_client
            .post(&url)
            .header("content-type", mime_type)
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let parsed: UploadFileResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        tracing::debug!(file = %parsed.file.name, state = ?parsed.file.state, "Staged file with provider");
        Ok(parsed.file)
    }

    async fn get_state(&self, name: &str) -> ProviderResult<FileState> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let file: RemoteFile = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(file.state)
    }

    async fn delete(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);

        let response = self.http_client.delete(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        tracing::debug!(file = %name, "Deleted staged file from provider");
        Ok(())
    }
}
