//! Mock store, model, and file-store implementations for tests

use async_trait::async_trait;
use seen_core::models::{Upload, VerificationStatus};
use seen_core::AppError;
use seen_db::VerificationStore;
use seen_genai::{FileState, FileStore, GenerateRequest, GenerativeModel, ProviderError,
    ProviderResult, RemoteFile};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Recorded terminal write from one verification attempt.
#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    pub verified: bool,
    pub status: VerificationStatus,
    pub result_text: String,
}

/// In-memory upload store honoring the soft-delete invariant.
#[derive(Clone, Default)]
pub struct MockUploadStore {
    uploads: Arc<Mutex<HashMap<Uuid, Upload>>>,
    pub updates: Arc<Mutex<Vec<(Uuid, RecordedUpdate)>>>,
    fail_updates: Arc<Mutex<bool>>,
}

impl MockUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_upload(&self, upload: Upload) {
        self.uploads.lock().unwrap().insert(upload.id, upload);
    }

    /// Make every subsequent update fail with a database error.
    pub fn fail_updates(&self) {
        *self.fail_updates.lock().unwrap() = true;
    }

    pub fn last_update_for(&self, id: Uuid) -> Option<RecordedUpdate> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| *u == id)
            .map(|(_, r)| r.clone())
    }
}

#[async_trait]
impl VerificationStore for MockUploadStore {
    async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        Ok(self
            .uploads
            .lock()
            .unwrap()
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }

    async fn update_verification(
        &self,
        id: Uuid,
        verified: bool,
        status: VerificationStatus,
        result_text: String,
    ) -> Result<Upload, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(AppError::Internal("connection reset".to_string()));
        }

        self.updates.lock().unwrap().push((
            id,
            RecordedUpdate {
                verified,
                status,
                result_text: result_text.clone(),
            },
        ));

        let mut uploads = self.uploads.lock().unwrap();
        let upload = uploads
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))?;
        upload.verified = verified;
        upload.verification_status = status;
        upload.verification_result = Some(result_text);
        Ok(upload.clone())
    }

    async fn list_pending_verification(&self, limit: i64) -> Result<Vec<Upload>, AppError> {
        let mut pending: Vec<Upload> = self
            .uploads
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.deleted_at.is_none() && u.verification_result.is_none())
            .cloned()
            .collect();
        pending.sort_by_key(|u| u.created_at);
        pending.truncate(limit.max(0) as usize);
        Ok(pending)
    }
}

/// Generative model that replays a fixed script of responses.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, String>>>,
    pub calls: Arc<AtomicU32>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, _request: &GenerateRequest) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ProviderError::Request(message)),
            None => Err(ProviderError::Request("script exhausted".to_string())),
        }
    }
}

/// File store that replays a scripted sequence of processing states.
pub struct MockFileStore {
    states: Mutex<VecDeque<FileState>>,
    repeat_last: Option<FileState>,
    pub stage_calls: Arc<AtomicU32>,
    pub state_calls: Arc<AtomicU32>,
    pub delete_calls: Arc<AtomicU32>,
}

impl MockFileStore {
    /// Poll responses come from `states` in order; once exhausted, `Active`.
    pub fn with_states(states: Vec<FileState>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            repeat_last: Some(FileState::Active),
            stage_calls: Arc::new(AtomicU32::new(0)),
            state_calls: Arc::new(AtomicU32::new(0)),
            delete_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A file that never finishes processing.
    pub fn always_processing() -> Self {
        Self {
            states: Mutex::new(VecDeque::new()),
            repeat_last: Some(FileState::Processing),
            stage_calls: Arc::new(AtomicU32::new(0)),
            state_calls: Arc::new(AtomicU32::new(0)),
            delete_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A file that is ready as soon as it is staged.
    pub fn immediately_active() -> Self {
        Self::with_states(Vec::new())
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn stage(&self, _data: Vec<u8>, _mime_type: &str) -> ProviderResult<RemoteFile> {
        self.stage_calls.fetch_add(1, Ordering::SeqCst);
        Ok(RemoteFile {
            name: "files/test".to_string(),
            uri: "https://provider/files/test".to_string(),
            state: FileState::Processing,
        })
    }

    async fn get_state(&self, _name: &str) -> ProviderResult<FileState> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        let popped = self.states.lock().unwrap().pop_front();
        match popped.or(self.repeat_last) {
            Some(state) => Ok(state),
            None => Err(ProviderError::Request("no scripted state".to_string())),
        }
    }

    async fn delete(&self, _name: &str) -> ProviderResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
