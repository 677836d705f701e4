//! Persistence seam for the verification pipeline
//!
//! The pipeline treats storage as a get-one/update-one/list-pending contract
//! keyed by upload id; it does not depend on the relational schema beyond
//! the fields on [`Upload`]. Tests substitute an in-memory implementation.

use async_trait::async_trait;
use seen_core::models::{Upload, VerificationStatus};
use seen_core::AppError;
use uuid::Uuid;

use crate::UploadRepository;

#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Load one upload; soft-deleted records are invisible.
    async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError>;

    /// Write the terminal verification state for one attempt.
    async fn update_verification(
        &self,
        id: Uuid,
        verified: bool,
        status: VerificationStatus,
        result_text: String,
    ) -> Result<Upload, AppError>;

    /// Records still awaiting verification, bounded.
    async fn list_pending_verification(&self, limit: i64) -> Result<Vec<Upload>, AppError>;
}

#[async_trait]
impl VerificationStore for UploadRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        UploadRepository::get(self, id).await
    }

    async fn update_verification(
        &self,
        id: Uuid,
        verified: bool,
        status: VerificationStatus,
        result_text: String,
    ) -> Result<Upload, AppError> {
        UploadRepository::update_verification(self, id, verified, status, result_text).await
    }

    async fn list_pending_verification(&self, limit: i64) -> Result<Vec<Upload>, AppError> {
        UploadRepository::list_pending_verification(self, limit).await
    }
}
