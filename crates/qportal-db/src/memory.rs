//! In-memory document repository for tests
//!
//! Mirrors the PostgreSQL repository's semantics without a database.

use async_trait::async_trait;
use chrono::Utc;
use qportal_core::models::{Document, DocumentChanges, NewDocument, PreviewArtifact};
use qportal_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::document::DocumentRepository;

#[derive(Clone, Default)]
pub struct InMemoryDocumentRepository {
    documents: Arc<Mutex<HashMap<Uuid, Document>>>,
    fail_preview_writes: Arc<AtomicBool>,
    fail_updates: Arc<AtomicBool>,
    preview_writes: Arc<AtomicUsize>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<Uuid, Document>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a document as-is, preview fields included.
    pub fn insert(&self, document: Document) {
        self.documents().insert(document.id, document);
    }

    /// Make subsequent `set_preview` calls fail with a database error.
    pub fn fail_preview_writes(&self, fail: bool) {
        self.fail_preview_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `update_document` calls fail with a database error.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set_preview` calls.
    pub fn preview_writes(&self) -> usize {
        self.preview_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self.documents().get(&id).cloned())
    }

    async fn list_active_documents(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, AppError> {
        let mut docs: Vec<Document> = self
            .documents()
            .values()
            .filter(|d| d.is_active)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_pdf_documents(&self, limit: i64) -> Result<Vec<Document>, AppError> {
        let mut docs: Vec<Document> = self
            .documents()
            .values()
            .filter(|d| d.is_pdf() && !d.file_path.is_empty())
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        docs.truncate(limit.max(0) as usize);
        Ok(docs)
    }

    async fn create_document(&self, new: NewDocument) -> Result<Document, AppError> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            price: new.price,
            preview_pages: new.preview_pages,
            file_path: new.file.path,
            file_name: new.file.name,
            file_type: new.file.file_type,
            file_size: new.file.size,
            preview: None,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        self.insert(document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        id: Uuid,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut documents = self.documents();
        let Some(document) = documents.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            document.title = title;
        }
        if let Some(description) = changes.description {
            document.description = Some(description);
        }
        if let Some(price) = changes.price {
            document.price = price;
        }
        if let Some(pages) = changes.preview_pages {
            document.preview_pages = Some(pages);
        }
        if let Some(active) = changes.is_active {
            document.is_active = active;
        }
        if let Some(file) = changes.file {
            document.file_path = file.path;
            document.file_name = file.name;
            document.file_type = file.file_type;
            document.file_size = file.size;
        }
        document.updated_at = Utc::now();

        Ok(Some(document.clone()))
    }

    async fn toggle_active(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let mut documents = self.documents();
        Ok(documents.get_mut(&id).map(|document| {
            document.is_active = !document.is_active;
            document.updated_at = Utc::now();
            document.clone()
        }))
    }

    async fn set_preview(&self, id: Uuid, preview: &PreviewArtifact) -> Result<bool, AppError> {
        if self.fail_preview_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut documents = self.documents();
        match documents.get_mut(&id) {
            Some(document) => {
                document.preview = Some(preview.clone());
                document.updated_at = Utc::now();
                self.preview_writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_preview(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(document) = self.documents().get_mut(&id) {
            document.preview = None;
            document.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.documents().remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qportal_core::models::StoredFile;

    fn new_document(path: &str, file_type: &str) -> NewDocument {
        NewDocument {
            title: "Handbook".to_string(),
            description: None,
            price: 0,
            preview_pages: Some(2),
            file: StoredFile {
                path: path.to_string(),
                name: "handbook.pdf".to_string(),
                file_type: file_type.to_string(),
                size: 1024,
            },
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_starts_without_preview() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo
            .create_document(new_document("documents/1_handbook.pdf", "application/pdf"))
            .await
            .unwrap();

        assert!(doc.preview.is_none());
        assert!(repo.get_document(doc.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_and_clear_preview() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo
            .create_document(new_document("documents/1_handbook.pdf", "application/pdf"))
            .await
            .unwrap();

        let preview = PreviewArtifact {
            path: "previews/preview_doc_x_1.pdf".to_string(),
            name: "preview_doc_x_1.pdf".to_string(),
            size: 10,
        };
        assert!(repo.set_preview(doc.id, &preview).await.unwrap());
        assert_eq!(
            repo.get_document(doc.id).await.unwrap().unwrap().preview,
            Some(preview)
        );
        assert_eq!(repo.preview_writes(), 1);

        repo.clear_preview(doc.id).await.unwrap();
        assert!(repo.get_document(doc.id).await.unwrap().unwrap().preview.is_none());
    }

    #[tokio::test]
    async fn test_failing_preview_writes_leave_document_untouched() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo
            .create_document(new_document("documents/1_handbook.pdf", "application/pdf"))
            .await
            .unwrap();
        repo.fail_preview_writes(true);

        let preview = PreviewArtifact {
            path: "previews/p.pdf".to_string(),
            name: "p.pdf".to_string(),
            size: 1,
        };
        assert!(repo.set_preview(doc.id, &preview).await.is_err());
        assert!(repo.get_document(doc.id).await.unwrap().unwrap().preview.is_none());
    }

    #[tokio::test]
    async fn test_list_pdf_documents_filters_and_limits() {
        let repo = InMemoryDocumentRepository::new();
        repo.create_document(new_document("documents/1_a.pdf", "application/pdf"))
            .await
            .unwrap();
        repo.create_document(new_document("documents/2_b.docx", "application/msword"))
            .await
            .unwrap();
        repo.create_document(new_document("documents/3_c.PDF", "application/octet-stream"))
            .await
            .unwrap();

        assert_eq!(repo.list_pdf_documents(10).await.unwrap().len(), 2);
        assert_eq!(repo.list_pdf_documents(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_active() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo
            .create_document(new_document("documents/1_a.pdf", "application/pdf"))
            .await
            .unwrap();

        let toggled = repo.toggle_active(doc.id).await.unwrap().unwrap();
        assert!(!toggled.is_active);
        assert!(repo.list_active_documents(10, 0).await.unwrap().is_empty());
        assert!(repo.toggle_active(Uuid::new_v4()).await.unwrap().is_none());
    }
}
