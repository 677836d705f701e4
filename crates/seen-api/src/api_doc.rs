//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use seen_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seen API",
        version = "0.1.0",
        description = "Content-verification API for geo-tagged media uploads. Upload records are checked against weather, astronomical, and location data plus visual analysis by a generative model. All endpoints are versioned under /api/v0/."
    ),
    paths(
        // Uploads
        handlers::uploads::create_upload,
        handlers::uploads::list_uploads,
        handlers::uploads::get_upload,
        handlers::uploads::delete_upload,
        // Verification
        handlers::verify::verify_upload,
        handlers::verify::verify_batch,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::uploads::CreateUploadRequest,
        handlers::verify::BatchVerifyRequest,
        models::Upload,
        models::MediaKind,
        models::LocationSource,
        models::VerificationStatus,
        models::VerificationOutcome,
        models::BatchItemOutcome,
    )),
    tags(
        (name = "uploads", description = "Upload record management"),
        (name = "verification", description = "Content-verification pipeline")
    )
)]
pub struct ApiDoc;
