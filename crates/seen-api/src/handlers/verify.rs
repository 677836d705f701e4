use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use seen_core::models::{BatchItemOutcome, VerificationOutcome};
use seen_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v0/uploads/{id}/verify",
    tag = "verification",
    params(("id" = Uuid, Path, description = "Upload ID")),
    responses(
        (status = 200, description = "Verification completed", body = VerificationOutcome),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 502, description = "Verification failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(upload_id = %id, operation = "verify_upload"))]
pub async fn verify_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let outcome = state.verifier.verify_upload(id).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct BatchVerifyRequest {
    /// Upper bound on records processed; server default when omitted.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v0/verifications/batch",
    tag = "verification",
    request_body = BatchVerifyRequest,
    responses(
        (status = 200, description = "Per-record outcomes for the batch", body = [BatchItemOutcome]),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "verify_batch"))]
pub async fn verify_batch(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BatchVerifyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let results = state.verifier.verify_pending(request.limit).await?;
    Ok(Json(results))
}
