//! Document lifecycle: create, update, delete and status toggling, with the
//! preview side effects each one implies.
//!
//! Preview generation never fails a lifecycle operation. The document is
//! saved first; a failed preview is logged and the document is returned
//! without one.

use std::sync::Arc;

use chrono::Utc;
use qportal_core::constants::PDF_CONTENT_TYPE;
use qportal_core::models::{has_pdf_extension, Document, DocumentChanges, NewDocument, StoredFile};
use qportal_core::AppError;
use qportal_db::DocumentRepository;
use qportal_processing::{DocumentFormat, DocumentInspector, PreviewOrchestrator};
use qportal_storage::{document_key, Storage};
use uuid::Uuid;

use crate::error::storage_error;

#[derive(Debug)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub original_name: String,
    pub content_type: String,
}

pub struct CreateDocument {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub preview_pages: Option<i32>,
    pub is_active: bool,
    pub file: UploadedFile,
}

#[derive(Default)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub preview_pages: Option<i32>,
    pub is_active: Option<bool>,
    pub file: Option<UploadedFile>,
}

pub struct DocumentLifecycleService {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn Storage>,
    previews: Arc<PreviewOrchestrator>,
}

impl DocumentLifecycleService {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
        previews: Arc<PreviewOrchestrator>,
    ) -> Self {
        Self {
            repository,
            storage,
            previews,
        }
    }

    /// Store the upload, insert the document and generate its preview.
    #[tracing::instrument(skip(self, input), fields(title = %input.title, file_name = %input.file.original_name))]
    pub async fn create(&self, input: CreateDocument) -> Result<Document, AppError> {
        let file = self.store_file(input.file).await?;
        let stored_path = file.path.clone();

        let new = NewDocument {
            title: input.title,
            description: input.description,
            price: input.price,
            preview_pages: Some(
                input
                    .preview_pages
                    .unwrap_or_else(|| i32::try_from(self.previews.default_pages()).unwrap_or(i32::MAX)),
            ),
            file,
            is_active: input.is_active,
        };

        let document = match self.repository.create_document(new).await {
            Ok(document) => document,
            Err(e) => {
                self.delete_file(&stored_path).await;
                return Err(e);
            }
        };
        tracing::info!(document_id = %document.id, file_path = %document.file_path, "Document created");

        if !has_pdf_extension(&document.file_path) {
            return Ok(document);
        }

        if !self.previews.is_available() {
            tracing::warn!(
                document_id = %document.id,
                "Preview engine unavailable, skipping preview generation"
            );
            return Ok(document);
        }

        let pages = self.previews.page_count_for(&document);
        if !self.previews.generate_document_preview(&document, pages).await {
            tracing::warn!(document_id = %document.id, "Preview generation failed for new document");
        }

        self.reload(document).await
    }

    /// Apply `input` to document `id`. A replacement file drops the old
    /// source and preview; a new file or page count triggers regeneration.
    #[tracing::instrument(skip(self, input), fields(document_id = %id))]
    pub async fn update(&self, id: Uuid, input: UpdateDocument) -> Result<Document, AppError> {
        let existing = self
            .repository
            .get_document(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        let pages_changed = input
            .preview_pages
            .is_some_and(|pages| Some(pages) != existing.preview_pages);

        let mut changes = DocumentChanges {
            title: input.title,
            description: input.description,
            price: input.price,
            preview_pages: input.preview_pages,
            is_active: input.is_active,
            file: None,
        };

        let new_path = match input.file {
            Some(upload) => {
                let stored = self.store_file(upload).await?;
                let path = stored.path.clone();
                changes.file = Some(stored);
                Some(path)
            }
            None => None,
        };
        let file_replaced = new_path.is_some();

        let updated = self
            .repository
            .update_document(id, changes)
            .await
            .and_then(|document| {
                document.ok_or_else(|| AppError::NotFound("Document not found".to_string()))
            });
        let mut document = match updated {
            Ok(document) => document,
            Err(e) => {
                if let Some(path) = new_path.as_deref().filter(|p| *p != existing.file_path) {
                    self.delete_file(path).await;
                }
                return Err(e);
            }
        };

        // The row points at the new file; the old source and preview can go.
        if let Some(path) = &new_path {
            if *path != existing.file_path {
                self.delete_file(&existing.file_path).await;
            }
            self.previews.discard_preview(&existing).await;
            document.preview = None;
        }

        if !(file_replaced || pages_changed) || !has_pdf_extension(&document.file_path) {
            return Ok(document);
        }

        if !matches!(self.storage.exists(&document.file_path).await, Ok(true)) {
            tracing::warn!(
                file_path = %document.file_path,
                "Document file not found, skipping preview regeneration"
            );
            return Ok(document);
        }

        if !self.previews.is_available() {
            tracing::warn!("Preview engine unavailable, skipping preview regeneration");
            return Ok(document);
        }

        let pages = self.previews.page_count_for(&document);
        if !self.previews.regenerate_document_preview(&document, pages).await {
            tracing::warn!("Preview regeneration failed for updated document");
        }

        self.reload(document).await
    }

    /// Delete the source file, the preview file and the row.
    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let document = self
            .repository
            .get_document(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        self.delete_file(&document.file_path).await;
        if let Some(preview) = &document.preview {
            self.delete_file(&preview.path).await;
        }

        if !self.repository.delete_document(id).await? {
            return Err(AppError::NotFound("Document not found".to_string()));
        }

        tracing::info!("Document deleted");
        Ok(())
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Document, AppError> {
        self.repository
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }

    async fn store_file(&self, upload: UploadedFile) -> Result<StoredFile, AppError> {
        let key = document_key(Utc::now().timestamp(), &upload.original_name);
        let is_pdf = has_pdf_extension(&key);

        if is_pdf {
            inspect_pdf_upload(&upload.data).await?;
        }

        let file_type = if is_pdf {
            PDF_CONTENT_TYPE.to_string()
        } else {
            upload.content_type
        };
        let size = i64::try_from(upload.data.len()).unwrap_or(i64::MAX);

        self.storage
            .put(&key, upload.data)
            .await
            .map_err(storage_error)?;

        Ok(StoredFile {
            path: key,
            name: upload.original_name,
            file_type,
            size,
        })
    }

    async fn delete_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(storage_key = %key, error = %e, "Failed to delete stored file");
        }
    }

    /// Re-read a document after preview generation; falls back to `document`
    /// if the read fails.
    async fn reload(&self, document: Document) -> Result<Document, AppError> {
        match self.repository.get_document(document.id).await {
            Ok(Some(fresh)) => Ok(fresh),
            Ok(None) => Err(AppError::NotFound("Document not found".to_string())),
            Err(e) => {
                tracing::warn!(document_id = %document.id, error = %e, "Failed to reload document");
                Ok(document)
            }
        }
    }
}

/// Reject `.pdf` uploads whose content is not a PDF or that parse to zero
/// pages. PDFs lopdf cannot parse are accepted; the preview engine has
/// fallbacks for those.
async fn inspect_pdf_upload(data: &[u8]) -> Result<(), AppError> {
    let format = DocumentInspector
        .validate(data)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    if format != DocumentFormat::Pdf {
        tracing::warn!(
            detected_format = format.as_str(),
            "Upload has a .pdf extension but is not a PDF"
        );
        return Err(AppError::InvalidInput(
            "File content is not a PDF document".to_string(),
        ));
    }

    let data_clone = data.to_vec();
    let metadata = tokio::task::spawn_blocking(move || DocumentInspector.pdf_metadata(&data_clone))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to inspect PDF: {}", e)))?;

    match metadata {
        Ok(metadata) if metadata.page_count == 0 => Err(AppError::InvalidInput(
            "PDF document has no pages".to_string(),
        )),
        Ok(metadata) => {
            tracing::debug!(
                page_count = metadata.page_count,
                pdf_title = ?metadata.title,
                pdf_author = ?metadata.author,
                "Inspected PDF upload"
            );
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "PDF upload could not be parsed for inspection");
            Ok(())
        }
    }
}
