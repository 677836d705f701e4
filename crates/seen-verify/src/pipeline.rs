//! Verification pipeline orchestration
//!
//! One run is a sequential async pipeline: load record, gather context,
//! precheck the description, fetch/stage media, build prompt, invoke with
//! retry, normalize, persist. The staged remote file (if any) is deleted
//! exactly once by the run that created it, on success and on every failure
//! path. The upload record is written exactly once per attempt with the
//! terminal state.
//!
//! Concurrent runs for the same upload id are not locked against each
//! other; both write their terminal state and the last writer wins.

use seen_core::config::VerifierConfig;
use seen_core::models::{
    BatchItemOutcome, ContextSnapshot, VerificationOutcome, VerificationStatus,
};
use seen_core::AppError;
use seen_context::ContextGatherer;
use seen_db::VerificationStore;
use seen_genai::{FileStore, GenerativeModel, MediaPart};
use std::sync::Arc;
use uuid::Uuid;

use crate::invoke::Invoker;
use crate::media::{FetchedMedia, MediaFetcher};
use crate::normalize::normalize_verdict;
use crate::prompt::{build_verification_prompt, precheck_description};

/// Drives content verification for upload records.
pub struct VerificationService {
    store: Arc<dyn VerificationStore>,
    gatherer: ContextGatherer,
    fetcher: MediaFetcher,
    files: Arc<dyn FileStore>,
    invoker: Invoker,
    config: VerifierConfig,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn VerificationStore>,
        gatherer: ContextGatherer,
        files: Arc<dyn FileStore>,
        model: Arc<dyn GenerativeModel>,
        config: VerifierConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            store,
            gatherer,
            fetcher: MediaFetcher::new()?,
            files,
            invoker: Invoker::new(model, config.max_attempts),
            config,
        })
    }

    /// Verify one upload and persist the terminal state.
    ///
    /// Success-path persistence failures surface as a database error
    /// distinct from verification failure; the verification itself
    /// succeeded. On invocation failure the error message is embedded in
    /// the record's result text (best effort) and the original error is
    /// returned.
    #[tracing::instrument(skip(self), fields(upload_id = %id))]
    pub async fn verify_upload(&self, id: Uuid) -> Result<VerificationOutcome, AppError> {
        let upload = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))?;

        let context = match upload.coordinate() {
            Some((latitude, longitude)) => {
                self.gatherer
                    .gather(latitude, longitude, upload.captured_at)
                    .await
            }
            None => ContextSnapshot::default(),
        };

        let alerts = precheck_description(upload.description.as_deref(), context.sun.as_ref());
        if !alerts.is_empty() {
            tracing::info!(alert_count = alerts.len(), "Pre-verification alerts raised");
        }

        let media = self
            .fetcher
            .fetch(&upload, self.files.as_ref(), &self.config)
            .await?;

        let prompt = build_verification_prompt(
            upload.description.as_deref(),
            &context,
            &alerts,
            upload.media_kind,
        );

        let (media_part, staged) = match media {
            FetchedMedia::InlineImage {
                mime_type,
                data_base64,
            } => (
                MediaPart::InlineImage {
                    mime_type,
                    data_base64,
                },
                None,
            ),
            FetchedMedia::StagedVideo(staged) => (
                MediaPart::RemoteFile {
                    uri: staged.uri.clone(),
                    mime_type: staged.mime_type.clone(),
                },
                Some(staged),
            ),
        };

        let invoked = self.invoker.invoke(&prompt, media_part).await;

        // The remote file slot is owned by this run and released exactly
        // once, whether the invocation succeeded or exhausted its retries.
        if let Some(staged) = staged {
            if let Err(e) = self.files.delete(&staged.name).await {
                tracing::warn!(file = %staged.name, error = %e, "Failed to delete staged provider file");
            }
        }

        match invoked {
            Ok(verdict) => {
                let outcome = normalize_verdict(&verdict, &alerts);
                self.store
                    .update_verification(
                        id,
                        outcome.verified,
                        outcome.status,
                        outcome.result_text(),
                    )
                    .await?;

                tracing::info!(
                    verified = outcome.verified,
                    status = %outcome.status,
                    issue_count = outcome.issues.len(),
                    "Verification completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                let failed = VerificationOutcome::failed(&err.to_string());
                if let Err(write_err) = self
                    .store
                    .update_verification(
                        id,
                        false,
                        VerificationStatus::Unverified,
                        failed.result_text(),
                    )
                    .await
                {
                    tracing::warn!(error = %write_err, "Failed to record verification failure");
                }
                Err(err)
            }
        }
    }

    /// Verify all records still awaiting verification, strictly one at a
    /// time, bounded. One record's terminal failure is isolated; the batch
    /// continues.
    #[tracing::instrument(skip(self))]
    pub async fn verify_pending(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<BatchItemOutcome>, AppError> {
        let limit = limit.unwrap_or(self.config.batch_limit);
        let pending = self.store.list_pending_verification(limit).await?;

        tracing::info!(count = pending.len(), "Processing pending verifications");

        let mut results = Vec::with_capacity(pending.len());
        for upload in pending {
            match self.verify_upload(upload.id).await {
                Ok(outcome) => results.push(BatchItemOutcome {
                    upload_id: upload.id,
                    verified: outcome.verified,
                    status: outcome.status,
                    error: None,
                }),
                Err(e) => {
                    tracing::error!(upload_id = %upload.id, error = %e, "Verification failed for batch record");
                    results.push(BatchItemOutcome {
                        upload_id: upload.id,
                        verified: false,
                        status: VerificationStatus::Unverified,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(results)
    }
}
