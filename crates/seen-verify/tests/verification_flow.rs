//! End-to-end pipeline tests against mocked collaborators
//!
//! The upload store, generative model, and provider file store are
//! in-memory mocks; media downloads and context providers run against a
//! local mockito server.

use chrono::{DateTime, TimeZone, Utc};
use seen_context::ContextGatherer;
use seen_core::config::VerifierConfig;
use seen_core::models::{MediaKind, Upload, VerificationStatus};
use seen_core::AppError;
use seen_db::VerificationStore;
use seen_verify::test_helpers::{MockFileStore, MockUploadStore, ScriptedModel};
use seen_verify::VerificationService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use uuid::Uuid;

fn make_upload(
    media_url: String,
    media_kind: MediaKind,
    description: Option<&str>,
    coordinate: Option<(f64, f64)>,
    captured_at: Option<DateTime<Utc>>,
) -> Upload {
    Upload {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        media_url,
        media_kind,
        description: description.map(|s| s.to_string()),
        latitude: coordinate.map(|(lat, _)| lat),
        longitude: coordinate.map(|(_, lng)| lng),
        location_source: None,
        captured_at,
        location_name: None,
        verified: false,
        verification_result: None,
        verification_status: VerificationStatus::Unverified,
        created_at: Utc::now(),
        deleted_at: None,
    }
}

fn test_config() -> VerifierConfig {
    VerifierConfig {
        max_attempts: 3,
        file_poll_interval_secs: 1,
        file_poll_timeout_secs: 30,
        batch_limit: 10,
    }
}

/// Gatherer pointed at an address that fails fast; context degrades to empty.
fn offline_gatherer(server_url: &str) -> ContextGatherer {
    ContextGatherer::from_urls(server_url, server_url, None, server_url).unwrap()
}

fn service(
    store: &MockUploadStore,
    gatherer: ContextGatherer,
    files: MockFileStore,
    model: ScriptedModel,
) -> (VerificationService, Arc<MockFileStore>) {
    let files = Arc::new(files);
    let service = VerificationService::new(
        Arc::new(store.clone()),
        gatherer,
        files.clone(),
        Arc::new(model),
        test_config(),
    )
    .unwrap();
    (service, files)
}

#[tokio::test]
async fn image_verification_persists_normalized_outcome() {
    let mut server = mockito::Server::new_async().await;
    let _media = server
        .mock("GET", "/shot.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .create_async()
        .await;

    let store = MockUploadStore::new();
    let upload = make_upload(
        format!("{}/shot.jpg", server.url()),
        MediaKind::Image,
        Some("a quiet pier"),
        None,
        None,
    );
    let id = upload.id;
    store.add_upload(upload);

    let model = ScriptedModel::new(vec![Ok(r#"{
        "status": "verified",
        "result": "Description is consistent with the photo.",
        "supporting_factors": ["scene matches description"]
    }"#
    .to_string())]);

    let (service, files) = service(
        &store,
        offline_gatherer(&server.url()),
        MockFileStore::immediately_active(),
        model,
    );

    let outcome = service.verify_upload(id).await.unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.status, VerificationStatus::Verified);

    let update = store.last_update_for(id).unwrap();
    assert!(update.verified);
    assert_eq!(update.status, VerificationStatus::Verified);
    assert!(update.result_text.contains("consistent with the photo"));

    // No video was staged, so nothing to delete
    assert_eq!(files.stage_calls.load(Ordering::SeqCst), 0);
    assert_eq!(files.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exhausted_retries_delete_staged_file_exactly_once() {
    let mut server = mockito::Server::new_async().await;
    let _media = server
        .mock("GET", "/clip.mp4")
        .with_status(200)
        .with_body(vec![0u8; 128])
        .create_async()
        .await;

    let store = MockUploadStore::new();
    let upload = make_upload(
        format!("{}/clip.mp4", server.url()),
        MediaKind::Video,
        Some("evening traffic"),
        None,
        None,
    );
    let id = upload.id;
    store.add_upload(upload);

    let model = ScriptedModel::new(vec![
        Err("upstream 500".to_string()),
        Ok("no json in this reply".to_string()),
        Err("upstream 500".to_string()),
    ]);

    let (service, files) = service(
        &store,
        offline_gatherer(&server.url()),
        MockFileStore::immediately_active(),
        model,
    );

    let err = service.verify_upload(id).await.unwrap_err();

    match err {
        AppError::VerificationFailed { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("unexpected error: {:?}", other),
    }

    // Scoped-resource contract: the staged file is released exactly once
    // even though every model attempt failed.
    assert_eq!(files.stage_calls.load(Ordering::SeqCst), 1);
    assert_eq!(files.delete_calls.load(Ordering::SeqCst), 1);

    // Terminal failure is written back, distinguishable from pending
    let update = store.last_update_for(id).unwrap();
    assert!(!update.verified);
    assert_eq!(update.status, VerificationStatus::Unverified);
    assert!(update.result_text.starts_with("Verification failed:"));
}

#[tokio::test]
async fn soft_deleted_upload_is_invisible_to_verification() {
    let server = mockito::Server::new_async().await;

    let store = MockUploadStore::new();
    let mut upload = make_upload(
        "https://cdn.example.com/gone.jpg".to_string(),
        MediaKind::Image,
        None,
        None,
        None,
    );
    upload.deleted_at = Some(Utc::now());
    let id = upload.id;
    store.add_upload(upload);

    let model = ScriptedModel::new(vec![]);
    let (service, _files) = service(
        &store,
        offline_gatherer(&server.url()),
        MockFileStore::immediately_active(),
        model,
    );

    let err = service.verify_upload(id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(store.updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn daytime_mismatch_alert_survives_clean_model_verdict() {
    let mut server = mockito::Server::new_async().await;
    let _media = server
        .mock("GET", "/shot.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .create_async()
        .await;
    let _sun = server
        .mock("GET", mockito::Matcher::Regex("^/json".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "results": {
                    "sunrise": "2025-06-21T05:47:00+00:00",
                    "sunset": "2025-06-21T20:35:00+00:00"
                },
                "status": "OK"
            }"#,
        )
        .create_async()
        .await;
    let _geocode = server
        .mock("GET", mockito::Matcher::Regex("^/reverse".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let store = MockUploadStore::new();
    // Captured at 23:00 UTC: nighttime by the sun signal
    let upload = make_upload(
        format!("{}/shot.jpg", server.url()),
        MediaKind::Image,
        Some("sunny afternoon"),
        Some((37.8, -122.4)),
        Some(Utc.with_ymd_and_hms(2025, 6, 21, 23, 0, 0).unwrap()),
    );
    let id = upload.id;
    store.add_upload(upload);

    // Model reports zero issues; the lexical alert must still survive
    let model = ScriptedModel::new(vec![Ok(r#"{
        "status": "verified",
        "result": "Nothing suspicious found.",
        "issues": []
    }"#
    .to_string())]);

    let gatherer = ContextGatherer::from_urls(&server.url(), &server.url(), None, &server.url())
        .unwrap();
    let (service, _files) = service(&store, gatherer, MockFileStore::immediately_active(), model);

    let outcome = service.verify_upload(id).await.unwrap();

    assert_eq!(outcome.issues.len(), 1);
    assert!(outcome.issues[0].contains("daytime"));

    let update = store.last_update_for(id).unwrap();
    assert!(update.result_text.contains("Issues detected:"));
    assert!(update.result_text.contains("daytime"));
}

#[tokio::test]
async fn persistence_failure_is_distinct_from_verification_failure() {
    let mut server = mockito::Server::new_async().await;
    let _media = server
        .mock("GET", "/shot.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(vec![0xFF, 0xD8])
        .create_async()
        .await;

    let store = MockUploadStore::new();
    let upload = make_upload(
        format!("{}/shot.jpg", server.url()),
        MediaKind::Image,
        None,
        None,
        None,
    );
    let id = upload.id;
    store.add_upload(upload);
    store.fail_updates();

    let model = ScriptedModel::new(vec![Ok(r#"{"status": "verified", "result": "ok"}"#
        .to_string())]);
    let (service, _files) = service(
        &store,
        offline_gatherer(&server.url()),
        MockFileStore::immediately_active(),
        model,
    );

    // The verification itself succeeded; only the write failed
    let err = service.verify_upload(id).await.unwrap_err();
    assert!(!matches!(err, AppError::VerificationFailed { .. }));
}

#[tokio::test]
async fn batch_isolates_per_record_failures() {
    let mut server = mockito::Server::new_async().await;
    let _media = server
        .mock("GET", mockito::Matcher::Regex("^/img".to_string()))
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(vec![0xFF, 0xD8])
        .expect_at_least(2)
        .create_async()
        .await;

    let store = MockUploadStore::new();
    let mut first = make_upload(
        format!("{}/img-1.jpg", server.url()),
        MediaKind::Image,
        None,
        None,
        None,
    );
    first.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let mut second = make_upload(
        format!("{}/img-2.jpg", server.url()),
        MediaKind::Image,
        None,
        None,
        None,
    );
    second.created_at = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
    let (first_id, second_id) = (first.id, second.id);
    store.add_upload(first);
    store.add_upload(second);

    // First record verifies on its only attempt; the second burns all three
    let model = ScriptedModel::new(vec![
        Ok(r#"{"status": "verified", "result": "ok"}"#.to_string()),
        Err("upstream 500".to_string()),
        Err("upstream 500".to_string()),
        Err("upstream 500".to_string()),
    ]);

    let (service, _files) = service(
        &store,
        offline_gatherer(&server.url()),
        MockFileStore::immediately_active(),
        model,
    );

    let results = service.verify_pending(None).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].upload_id, first_id);
    assert!(results[0].verified);
    assert!(results[0].error.is_none());

    assert_eq!(results[1].upload_id, second_id);
    assert!(!results[1].verified);
    assert!(results[1].error.is_some());

    // Both records got their terminal write
    let second_update = store.last_update_for(second_id).unwrap();
    assert!(second_update.result_text.starts_with("Verification failed:"));
}

#[tokio::test]
async fn verified_upload_no_longer_listed_as_pending() {
    let mut server = mockito::Server::new_async().await;
    let _media = server
        .mock("GET", "/shot.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(vec![0xFF, 0xD8])
        .create_async()
        .await;

    let store = MockUploadStore::new();
    let upload = make_upload(
        format!("{}/shot.jpg", server.url()),
        MediaKind::Image,
        None,
        None,
        None,
    );
    let id = upload.id;
    store.add_upload(upload);

    let model = ScriptedModel::new(vec![Ok(r#"{"status": "verified", "result": "ok"}"#
        .to_string())]);
    let (service, _files) = service(
        &store,
        offline_gatherer(&server.url()),
        MockFileStore::immediately_active(),
        model,
    );

    service.verify_upload(id).await.unwrap();

    let pending = store.list_pending_verification(10).await.unwrap();
    assert!(pending.is_empty());
}
