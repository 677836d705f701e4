//! Media fetching and provider staging
//!
//! Images are downloaded and inlined as base64. Videos are too large for the
//! model's context API, so they are spooled through a scoped temp file and
//! staged with the provider's file-storage endpoint, then polled until the
//! remote copy is ready. The remote file is owned by the verification run
//! that created it; staging failures delete any partially-created file
//! before propagating.

use anyhow::Context;
use base64::Engine;
use reqwest::Client;
use seen_core::config::VerifierConfig;
use seen_core::models::{MediaKind, Upload};
use seen_core::AppError;
use seen_genai::{FileState, FileStore};
use std::io::Write;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// A staged provider file plus the MIME type it was uploaded with.
#[derive(Debug, Clone)]
pub struct StagedVideo {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

/// Media prepared for one verification attempt.
#[derive(Debug, Clone)]
pub enum FetchedMedia {
    InlineImage {
        mime_type: String,
        data_base64: String,
    },
    StagedVideo(StagedVideo),
}

impl FetchedMedia {
    pub fn staged(&self) -> Option<&StagedVideo> {
        match self {
            FetchedMedia::StagedVideo(staged) => Some(staged),
            FetchedMedia::InlineImage { .. } => None,
        }
    }
}

/// Downloads upload media and stages videos with the provider.
#[derive(Clone)]
pub struct MediaFetcher {
    http_client: Client,
}

impl MediaFetcher {
    pub fn new() -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Prepare the upload's media for the model call.
    pub async fn fetch(
        &self,
        upload: &Upload,
        files: &dyn FileStore,
        poll: &VerifierConfig,
    ) -> Result<FetchedMedia, AppError> {
        match upload.media_kind {
            MediaKind::Image => self.fetch_image(&upload.media_url).await,
            MediaKind::Video => self
                .stage_video(&upload.media_url, files, poll)
                .await
                .map(FetchedMedia::StagedVideo),
        }
    }

    async fn download(&self, url: &str) -> Result<(Vec<u8>, Option<String>), AppError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::MediaFetch(format!("Failed to download media: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::MediaFetch(format!(
                "Media download returned {}",
                status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(';').next().unwrap_or(s).trim().to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::MediaFetch(format!("Failed to read media body: {}", e)))?;

        Ok((bytes.to_vec(), content_type))
    }

    async fn fetch_image(&self, url: &str) -> Result<FetchedMedia, AppError> {
        let (data, content_type) = self.download(url).await?;

        let mime_type = content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| image_mime_for_url(url).to_string());

        tracing::debug!(bytes = data.len(), mime_type = %mime_type, "Downloaded image for inline attachment");

        Ok(FetchedMedia::InlineImage {
            mime_type,
            data_base64: base64::engine::general_purpose::STANDARD.encode(&data),
        })
    }

    async fn stage_video(
        &self,
        url: &str,
        files: &dyn FileStore,
        poll: &VerifierConfig,
    ) -> Result<StagedVideo, AppError> {
        let (data, _) = self.download(url).await?;
        let mime_type = video_mime_for_url(url).to_string();

        // Spool to a scoped temp file; removed on every exit path by RAII.
        let mut temp = tempfile::NamedTempFile::new()
            .context("Failed to create temp file for video staging")
            .map_err(AppError::from)?;
        temp.write_all(&data)
            .context("Failed to spool video to temp file")
            .map_err(AppError::from)?;

        let staged_bytes = tokio::fs::read(temp.path())
            .await
            .context("Failed to read spooled video")
            .map_err(AppError::from)?;

        let file = files
            .stage(staged_bytes, &mime_type)
            .await
            .map_err(|e| AppError::Staging(format!("Provider upload failed: {}", e)))?;

        tracing::info!(file = %file.name, mime_type = %mime_type, "Staged video with provider, awaiting processing");

        if let Err(e) = wait_until_active(files, &file.name, file.state, poll).await {
            // The partially-created remote file is deleted before the
            // failure propagates.
            if let Err(delete_err) = files.delete(&file.name).await {
                tracing::warn!(file = %file.name, error = %delete_err, "Failed to delete remote file after staging failure");
            }
            return Err(e);
        }

        if let Err(e) = temp.close() {
            tracing::warn!(error = %e, "Failed to remove spooled video temp file");
        }

        Ok(StagedVideo {
            name: file.name,
            uri: file.uri,
            mime_type,
        })
    }
}

/// Poll the staged file until it reaches a ready state.
///
/// Fixed cadence, hard ceiling: a file that is not `Active` within the
/// timeout, or that reports `Failed`, terminates this verification attempt.
pub(crate) async fn wait_until_active(
    files: &dyn FileStore,
    name: &str,
    initial_state: FileState,
    poll: &VerifierConfig,
) -> Result<(), AppError> {
    let started = Instant::now();
    let timeout = Duration::from_secs(poll.file_poll_timeout_secs);
    let interval = Duration::from_secs(poll.file_poll_interval_secs);
    let mut state = initial_state;

    loop {
        match state {
            FileState::Active => return Ok(()),
            FileState::Failed => {
                return Err(AppError::Staging(
                    "Provider reported file processing failed".to_string(),
                ));
            }
            FileState::Processing | FileState::Unknown => {}
        }

        if started.elapsed() >= timeout {
            return Err(AppError::Staging(format!(
                "File processing did not complete within {}s",
                poll.file_poll_timeout_secs
            )));
        }

        sleep(interval).await;

        state = files
            .get_state(name)
            .await
            .map_err(|e| AppError::Staging(format!("Failed to poll file state: {}", e)))?;
    }
}

fn image_mime_for_url(url: &str) -> &'static str {
    match url_extension(url).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => DEFAULT_IMAGE_MIME,
    }
}

/// Infer a video MIME type from the URL's file extension; unrecognized
/// extensions fall back to the generic default.
pub fn video_mime_for_url(url: &str) -> &'static str {
    match url_extension(url).as_deref() {
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("mpg") | Some("mpeg") => "video/mpeg",
        Some("3gp") => "video/3gpp",
        Some("mp4") | Some("m4v") => "video/mp4",
        _ => DEFAULT_VIDEO_MIME,
    }
}

fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('/').next()?.rsplit_once('.')?.1;
    Some(ext.to_ascii_lowercase())
}
