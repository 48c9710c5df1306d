//! Test helpers: build AppState and router for integration tests.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum_test::TestServer;
use qportal_api::setup::routes;
use qportal_api::state::AppState;
use qportal_core::config::PreviewSettings;
use qportal_core::PortalConfig;
use qportal_db::InMemoryDocumentRepository;
use qportal_storage::LocalStorage;
use tempfile::TempDir;

/// Test application: server plus the resources it owns.
pub struct TestApp {
    pub server: TestServer,
    pub repository: InMemoryDocumentRepository,
    pub storage_dir: TempDir,
}

impl TestApp {
    /// Files currently present under `previews/`.
    pub fn preview_files(&self) -> Vec<String> {
        list_dir(&self.storage_dir.path().join("previews"))
    }

    /// Files currently present under `documents/`.
    pub fn document_files(&self) -> Vec<String> {
        list_dir(&self.storage_dir.path().join("documents"))
    }

    pub fn stored_path(&self, key: &str) -> std::path::PathBuf {
        self.storage_dir.path().join(key)
    }
}

fn list_dir(dir: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn test_config(storage_path: &str, preview_enabled: bool) -> PortalConfig {
    PortalConfig {
        server_port: 0,
        environment: "test".to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        local_storage_path: storage_path.to_string(),
        local_storage_base_url: "http://localhost:4000/storage".to_string(),
        max_document_size_bytes: 1024 * 1024,
        document_allowed_extensions: vec!["pdf".to_string(), "txt".to_string()],
        preview: PreviewSettings {
            enabled: preview_enabled,
            ..Default::default()
        },
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(true).await
}

pub async fn setup_test_app_with(preview_enabled: bool) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(&storage_dir.path().to_string_lossy(), preview_enabled);

    let storage = LocalStorage::new(storage_dir.path(), config.local_storage_base_url.clone())
        .await
        .expect("local storage");
    let repository = InMemoryDocumentRepository::new();

    let state = AppState::new(config.clone(), Arc::new(repository.clone()), Arc::new(storage));
    let router = routes::setup_routes(&config, state);
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        repository,
        storage_dir,
    }
}
