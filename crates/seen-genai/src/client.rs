//! Content-generation client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{ProviderError, ProviderResult};

const HTTP_TIMEOUT_SECS: u64 = 120;

/// Media accompanying a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPart {
    /// Small media passed inline, base64-encoded.
    InlineImage {
        mime_type: String,
        data_base64: String,
    },
    /// Large media passed by reference to a previously staged remote file.
    RemoteFile { uri: String, mime_type: String },
    /// Text-only request.
    None,
}

/// One generation request: a prompt plus optional media.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub media: MediaPart,
    /// Allow the model to consult its web-search tool.
    pub enable_web_search: bool,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            media: MediaPart::None,
            enable_web_search: false,
        }
    }
}

/// Trait for the synchronous content-generation capability.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Invoke the model; returns the raw response text of the first candidate.
    async fn generate(&self, request: &GenerateRequest) -> ProviderResult<String>;
}

// generateContent request/response structures
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

// Untagged: each variant already carries its wire-format key as the field name.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        inline_data: Blob,
    },
    FileData {
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct FileData {
    file_uri: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Tool {
    GoogleSearch { google_search: EmptyObject },
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// HTTP client for the provider's generateContent endpoint.
#[derive(Clone)]
pub struct GenaiClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl Debug for GenaiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GenaiClient")
            .field("model", &self.model)
            .finish()
    }
}

impl GenaiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> ProviderResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn build_parts(request: &GenerateRequest) -> Vec<Part> {
        let mut parts = Vec::with_capacity(2);
        match &request.media {
            MediaPart::InlineImage {
                mime_type,
                data_base64,
            } => parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: mime_type.clone(),
                    data: data_base64.clone(),
                },
            }),
            MediaPart::RemoteFile { uri, mime_type } => parts.push(Part::FileData {
                file_data: FileData {
                    file_uri: uri.clone(),
                    mime_type: mime_type.clone(),
                },
            }),
            MediaPart::None => {}
        }
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });
        parts
    }
}

#[async_trait]
impl GenerativeModel for GenaiClient {
    async fn generate(&self, request: &GenerateRequest) -> ProviderResult<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: Self::build_parts(request),
            }],
            tools: if request.enable_web_search {
                vec![Tool::GoogleSearch {
                    google_search: EmptyObject {},
                }]
            } else {
                Vec::new()
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self.http_client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::Decode(
                "Response contained no candidate text".to_string(),
            ));
        }

        Ok(text)
    }
}
