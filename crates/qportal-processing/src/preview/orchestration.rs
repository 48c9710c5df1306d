//! Ties the preview engine to document records.
//!
//! The orchestrator is the only writer of a document's preview fields. Two
//! concurrent runs for the same document are not serialized: the last
//! `set_preview` wins and the losing run's file is left in `previews/`.

use std::sync::Arc;

use chrono::Utc;
use qportal_core::models::{Document, PreviewArtifact};
use qportal_db::DocumentRepository;
use qportal_storage::{file_name_of, preview_key, Storage};

use super::engine::PreviewEngine;

pub struct PreviewOrchestrator {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn Storage>,
    engine: Arc<PreviewEngine>,
    default_pages: u32,
}

impl PreviewOrchestrator {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
        engine: Arc<PreviewEngine>,
        default_pages: u32,
    ) -> Self {
        Self {
            repository,
            storage,
            engine,
            default_pages,
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_available()
    }

    pub fn engine(&self) -> &PreviewEngine {
        &self.engine
    }

    pub fn default_pages(&self) -> u32 {
        self.default_pages
    }

    /// Pages to put in the preview of `document`.
    pub fn page_count_for(&self, document: &Document) -> u32 {
        document.preview_page_count(self.default_pages)
    }

    /// Generate a preview for `document` and record it. Returns `true` only
    /// when the file was written and the document now points at it.
    #[tracing::instrument(skip(self, document), fields(document_id = %document.id))]
    pub async fn generate_document_preview(&self, document: &Document, page_count: u32) -> bool {
        let source_path = match self.storage.resolve_path(&document.file_path) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(
                    file_path = %document.file_path,
                    error = %e,
                    "Document file path cannot be resolved for preview generation"
                );
                return false;
            }
        };

        if !matches!(self.storage.exists(&document.file_path).await, Ok(true)) {
            tracing::warn!(
                file_path = %document.file_path,
                "Document file not found for preview generation"
            );
            return false;
        }

        let key = preview_key(document.id, Utc::now().timestamp());
        let output_path = match self.storage.resolve_path(&key) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(preview_path = %key, error = %e, "Invalid preview path");
                return false;
            }
        };

        if !self
            .engine
            .generate_preview(&source_path, &output_path, page_count)
            .await
        {
            return false;
        }

        let size = match self.storage.content_length(&key).await {
            Ok(size) => size,
            Err(e) => {
                tracing::error!(preview_path = %key, error = %e, "Generated preview is not readable");
                return false;
            }
        };

        let artifact = PreviewArtifact {
            name: file_name_of(&key).to_string(),
            path: key,
            size: i64::try_from(size).unwrap_or(i64::MAX),
        };

        match self.repository.set_preview(document.id, &artifact).await {
            Ok(true) => {
                tracing::info!(
                    preview_path = %artifact.path,
                    preview_size = artifact.size,
                    "Document preview recorded"
                );
                if let Some(old) = &document.preview {
                    if old.path != artifact.path {
                        self.delete_file(&old.path).await;
                    }
                }
                true
            }
            Ok(false) => {
                tracing::warn!(
                    preview_path = %artifact.path,
                    "Document disappeared during preview generation"
                );
                self.delete_file(&artifact.path).await;
                false
            }
            Err(e) => {
                tracing::error!(
                    orphaned_preview_path = %artifact.path,
                    error = %e,
                    "Preview written but document update failed"
                );
                false
            }
        }
    }

    /// Discard the current preview, then generate a new one.
    pub async fn regenerate_document_preview(&self, document: &Document, page_count: u32) -> bool {
        self.discard_preview(document).await;

        let mut cleared = document.clone();
        cleared.preview = None;
        self.generate_document_preview(&cleared, page_count).await
    }

    /// Delete the preview file (if any) and clear the preview fields.
    /// Failures are logged and otherwise ignored.
    pub async fn discard_preview(&self, document: &Document) {
        let Some(preview) = &document.preview else {
            return;
        };

        self.delete_file(&preview.path).await;
        if let Err(e) = self.repository.clear_preview(document.id).await {
            tracing::warn!(
                document_id = %document.id,
                error = %e,
                "Failed to clear preview fields"
            );
        }
    }

    async fn delete_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(preview_path = %key, error = %e, "Failed to delete preview file");
        }
    }
}
