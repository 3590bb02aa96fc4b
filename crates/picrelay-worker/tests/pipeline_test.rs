//! End-to-end pipeline tests.
//!
//! Exercise the handler against a mock render API (mockito), the local
//! storage backend in a temp directory, and an in-memory session lookup.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use picrelay_core::{ChangeEvent, SessionRecord};
use picrelay_db::SessionLookup;
use picrelay_storage::{LocalStorage, Storage};
use picrelay_worker::{EventHandler, ImageFetcher};

const DEST_FOLDER: &str = "session-exports";

struct StubLookup(Option<SessionRecord>);

#[async_trait]
impl SessionLookup for StubLookup {
    async fn lookup(&self, _path: &str) -> Option<SessionRecord> {
        self.0.clone()
    }
}

async fn build_handler(
    server_url: String,
    storage_dir: &Path,
    session: Option<SessionRecord>,
) -> EventHandler {
    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(storage_dir).await.unwrap());
    let fetcher = ImageFetcher::new(server_url, None).unwrap();
    EventHandler::new(
        Arc::new(StubLookup(session)),
        fetcher,
        storage,
        DEST_FOLDER.to_string(),
    )
}

fn uploaded_names(storage_dir: &Path) -> Vec<String> {
    let folder = storage_dir.join(DEST_FOLDER);
    if !folder.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(folder)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn enriched_event_uploads_under_derived_name() {
    let mut server = mockito::Server::new_async().await;
    let fetch = server
        .mock("GET", "/out/9f1-final.png")
        .with_status(200)
        .with_body(b"png-bytes".as_slice())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = SessionRecord {
        session_id: 42,
        display_name: Some("jane doe".to_string()),
        style_tag: Some("small_business_owners".to_string()),
    };
    let handler = build_handler(server.url(), dir.path(), Some(session)).await;

    handler
        .handle(ChangeEvent::new("new_image_event", "/out/9f1-final.png"))
        .await;

    fetch.assert_async().await;
    let names = uploaded_names(dir.path());
    assert_eq!(names.len(), 1);
    let name = &names[0];
    assert!(
        name.starts_with("Jane Doe - Small Business Owners - Final Output - "),
        "unexpected name: {}",
        name
    );
    assert!(name.ends_with(".png"), "unexpected name: {}", name);

    let content = std::fs::read(dir.path().join(DEST_FOLDER).join(name)).unwrap();
    assert_eq!(content, b"png-bytes");
}

#[tokio::test]
async fn unenriched_event_falls_back_to_original_token() {
    let mut server = mockito::Server::new_async().await;
    let fetch = server
        .mock("GET", "/out/9f1-qr")
        .with_status(200)
        .with_body(b"qr-bytes".as_slice())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let handler = build_handler(server.url(), dir.path(), None).await;

    handler
        .handle(ChangeEvent::new("new_image_event", "/out/9f1-qr"))
        .await;

    // No image row matched: the name is the token exactly, no extension
    // inferred, and the run still fetched and uploaded.
    fetch.assert_async().await;
    assert_eq!(uploaded_names(dir.path()), vec!["9f1-qr".to_string()]);
}

#[tokio::test]
async fn fetch_failure_aborts_run_without_upload() {
    let mut server = mockito::Server::new_async().await;
    let fetch = server
        .mock("GET", "/out/gone.png")
        .with_status(404)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = SessionRecord {
        session_id: 7,
        display_name: Some("Ann".to_string()),
        style_tag: None,
    };
    let handler = build_handler(server.url(), dir.path(), Some(session)).await;

    handler
        .handle(ChangeEvent::new("new_image_event", "/out/gone.png"))
        .await;

    fetch.assert_async().await;
    assert!(uploaded_names(dir.path()).is_empty());
}

#[tokio::test]
async fn pathless_payload_uses_literal_fallback_name() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body(b"bytes".as_slice())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let handler = build_handler(server.url(), dir.path(), None).await;

    handler
        .handle(ChangeEvent::new("new_image_event", "/"))
        .await;

    assert_eq!(uploaded_names(dir.path()), vec!["untitled.png".to_string()]);
}

#[tokio::test]
async fn upload_failure_is_absorbed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/out/a.png")
        .with_status(200)
        .with_body(b"bytes".as_slice())
        .create_async()
        .await;

    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn upload(
            &self,
            _folder: &str,
            _filename: &str,
            _data: Vec<u8>,
        ) -> picrelay_storage::StorageResult<String> {
            Err(picrelay_storage::StorageError::UploadFailed(
                "bucket unavailable".to_string(),
            ))
        }
    }

    let fetcher = ImageFetcher::new(server.url(), None).unwrap();
    let handler = EventHandler::new(
        Arc::new(StubLookup(None)),
        fetcher,
        Arc::new(FailingStorage),
        DEST_FOLDER.to_string(),
    );

    // Must not panic or propagate; the run is simply dropped.
    handler
        .handle(ChangeEvent::new("new_image_event", "/out/a.png"))
        .await;
}
