use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use seen_core::models::{LocationSource, MediaKind, Upload};
use seen_core::{validation, AppError};
use seen_db::ListUploadsParams;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUploadRequest {
    pub owner_id: Uuid,
    #[validate(length(min = 1, max = 2048))]
    pub media_url: String,
    pub media_kind: MediaKind,
    #[validate(length(max = 100))]
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_source: Option<LocationSource>,
    pub captured_at: Option<DateTime<Utc>>,
    pub location_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/uploads",
    tag = "uploads",
    request_body = CreateUploadRequest,
    responses(
        (status = 201, description = "Upload record created", body = Upload),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(owner_id = %request.owner_id, operation = "create_upload"))]
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    validation::validate_description(request.description.as_deref())?;
    validation::validate_coordinate(request.latitude, request.longitude)?;

    let upload = state
        .uploads
        .create(
            request.owner_id,
            request.media_url,
            request.media_kind,
            request.description,
            request.latitude,
            request.longitude,
            request.location_source,
            request.captured_at,
            request.location_name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(upload)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUploadsQuery {
    /// Lower bound on capture time (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Upper bound on capture time (inclusive).
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v0/uploads",
    tag = "uploads",
    params(ListUploadsQuery),
    responses(
        (status = 200, description = "Uploads matching the filter", body = [Upload]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_uploads"))]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListUploadsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploads = state
        .uploads
        .list(ListUploadsParams {
            captured_from: query.from,
            captured_to: query.to,
            limit: query.limit,
        })
        .await?;

    Ok(Json(uploads))
}

#[utoipa::path(
    get,
    path = "/api/v0/uploads/{id}",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Upload ID")),
    responses(
        (status = 200, description = "Upload found", body = Upload),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(upload_id = %id, operation = "get_upload"))]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = state
        .uploads
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Upload not found".to_string()))?;

    Ok(Json(upload))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteUploadQuery {
    /// Owner performing the delete; only the owner may soft-delete.
    pub owner_id: Uuid,
}

#[utoipa::path(
    delete,
    path = "/api/v0/uploads/{id}",
    tag = "uploads",
    params(
        ("id" = Uuid, Path, description = "Upload ID"),
        DeleteUploadQuery
    ),
    responses(
        (status = 204, description = "Upload soft-deleted"),
        (status = 404, description = "Upload not found or not owned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(upload_id = %id, owner_id = %query.owner_id, operation = "delete_upload"))]
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteUploadQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.uploads.soft_delete(id, query.owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
