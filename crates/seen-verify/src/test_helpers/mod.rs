//! Mock collaborators for testing
//!
//! These mocks allow exercising the pipeline without a database or live
//! provider endpoints.

mod mock_collaborators;

pub use mock_collaborators::{MockFileStore, MockUploadStore, RecordedUpdate, ScriptedModel};
