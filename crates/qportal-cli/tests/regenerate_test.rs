use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lopdf::{dictionary, Document as PdfDocument, Object};
use qportal_cli::{regenerate_to_stdout, PreviewTools, RegenerationSummary};
use qportal_core::config::PreviewSettings;
use qportal_core::models::Document;
use qportal_core::PortalConfig;
use qportal_db::{DocumentRepository, InMemoryDocumentRepository};
use qportal_storage::{LocalStorage, Storage};
use tempfile::tempdir;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn blank_pdf(pages: u32) -> Vec<u8> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id })
                .into()
        })
        .collect();
    let media_box: Vec<Object> = vec![0.into(), 0.into(), 612.into(), 792.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages),
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn config(storage_path: &str) -> PortalConfig {
    PortalConfig {
        server_port: 0,
        environment: "test".to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        local_storage_path: storage_path.to_string(),
        local_storage_base_url: "http://localhost/storage".to_string(),
        max_document_size_bytes: 1024,
        document_allowed_extensions: vec!["pdf".to_string()],
        preview: PreviewSettings::default(),
    }
}

// Strategies log from blocking threads through a subscriber that writes to
// stdout, the same stream the progress lines go to.
#[tokio::test]
async fn regenerate_to_stdout_with_debug_logging_completes() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_writer(std::io::stdout)
        .try_init();

    let dir = tempdir().unwrap();
    let storage = Arc::new(
        LocalStorage::new(dir.path(), "http://localhost/storage".to_string())
            .await
            .unwrap(),
    );
    let repository = InMemoryDocumentRepository::new();
    let tools = PreviewTools::new(
        &config(&dir.path().to_string_lossy()),
        Arc::new(repository.clone()),
        storage.clone(),
    );

    storage
        .put("documents/1_manual.pdf", blank_pdf(5))
        .await
        .unwrap();
    let now = Utc::now();
    let document = Document {
        id: Uuid::new_v4(),
        title: "Manual".to_string(),
        description: None,
        price: 0,
        preview_pages: Some(2),
        file_path: "documents/1_manual.pdf".to_string(),
        file_name: "manual.pdf".to_string(),
        file_type: "application/pdf".to_string(),
        file_size: 0,
        preview: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repository.insert(document.clone());

    let summary = tokio::time::timeout(
        Duration::from_secs(30),
        regenerate_to_stdout(&tools, std::slice::from_ref(&document)),
    )
    .await
    .expect("regeneration should not block on stdout")
    .unwrap();

    assert_eq!(summary, RegenerationSummary { succeeded: 1, failed: 0 });
    let updated = repository.get_document(document.id).await.unwrap().unwrap();
    assert!(updated.has_preview());
}
