//! Application state shared across handlers.

use seen_db::UploadRepository;
use seen_verify::VerificationService;
use std::sync::Arc;

pub struct AppState {
    pub uploads: UploadRepository,
    pub verifier: Arc<VerificationService>,
}
