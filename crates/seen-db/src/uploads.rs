use chrono::{DateTime, Utc};
use seen_core::models::{LocationSource, MediaKind, Upload, VerificationStatus};
use seen_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Filter parameters for listing uploads.
#[derive(Debug, Clone, Default)]
pub struct ListUploadsParams {
    /// Lower bound on capture time (inclusive).
    pub captured_from: Option<DateTime<Utc>>,
    /// Upper bound on capture time (inclusive).
    pub captured_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

const DEFAULT_LIST_LIMIT: i64 = 100;

/// Upload repository
///
/// Owns all reads and writes for the `uploads` table. Soft-deleted rows
/// (`deleted_at IS NOT NULL`) are excluded from every query here; there is
/// no code path that returns them.
#[derive(Clone)]
pub struct UploadRepository {
    pool: PgPool,
}

impl UploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "insert", owner_id = %owner_id))]
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        owner_id: Uuid,
        media_url: String,
        media_kind: MediaKind,
        description: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        location_source: Option<LocationSource>,
        captured_at: Option<DateTime<Utc>>,
        location_name: Option<String>,
    ) -> Result<Upload, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let upload: Upload = sqlx::query_as::<Postgres, Upload>(
            r#"
            INSERT INTO uploads (
                id, owner_id, media_url, media_kind,
                description, latitude, longitude, location_source,
                captured_at, location_name,
                verified, verification_result, verification_status,
                created_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, NULL, 'unverified', $11, NULL)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&media_url)
        .bind(media_kind)
        .bind(&description)
        .bind(latitude)
        .bind(longitude)
        .bind(location_source)
        .bind(captured_at)
        .bind(&location_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(upload)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        let upload = sqlx::query_as::<Postgres, Upload>(
            r#"
            SELECT * FROM uploads
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(upload)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select"))]
    pub async fn list(&self, params: ListUploadsParams) -> Result<Vec<Upload>, AppError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 1000);

        let uploads = sqlx::query_as::<Postgres, Upload>(
            r#"
            SELECT * FROM uploads
            WHERE deleted_at IS NULL
              AND ($1::timestamptz IS NULL OR captured_at >= $1)
              AND ($2::timestamptz IS NULL OR captured_at <= $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(params.captured_from)
        .bind(params.captured_to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(uploads)
    }

    /// Records still awaiting verification: no result text yet, oldest first.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select"))]
    pub async fn list_pending_verification(&self, limit: i64) -> Result<Vec<Upload>, AppError> {
        let uploads = sqlx::query_as::<Postgres, Upload>(
            r#"
            SELECT * FROM uploads
            WHERE deleted_at IS NULL AND verification_result IS NULL
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;

        Ok(uploads)
    }

    /// Write the terminal state of one verification attempt. Single UPDATE;
    /// overwrites any prior pending state.
    #[tracing::instrument(skip(self, result_text), fields(db.table = "uploads", db.operation = "update", db.record_id = %id))]
    pub async fn update_verification(
        &self,
        id: Uuid,
        verified: bool,
        status: VerificationStatus,
        result_text: String,
    ) -> Result<Upload, AppError> {
        let upload = sqlx::query_as::<Postgres, Upload>(
            r#"
            UPDATE uploads
            SET verified = $2, verification_status = $3, verification_result = $4
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(verified)
        .bind(status)
        .bind(&result_text)
        .fetch_optional(&self.pool)
        .await?;

        upload.ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))
    }

    /// Owner-scoped soft delete. Returns NotFound when the row is absent,
    /// already deleted, or owned by someone else.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "update", db.record_id = %id, owner_id = %owner_id))]
    pub async fn soft_delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE uploads
            SET deleted_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Upload {} not found", id)));
        }

        Ok(())
    }
}
