use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{MAX_PREVIEW_PAGES, MIN_PREVIEW_PAGES, PDF_CONTENT_TYPE, PDF_EXTENSION};

/// A generated preview file and the metadata persisted alongside it.
///
/// The three fields are stored as separate nullable columns but are only ever
/// present together, so the model carries them as one optional value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewArtifact {
    /// Storage key relative to the public disk root
    pub path: String,
    /// Display name used in `Content-Disposition`
    pub name: String,
    /// Size in bytes
    pub size: i64,
}

impl PreviewArtifact {
    /// Rebuild the artifact from its persisted columns. A partially populated
    /// triple is treated as no preview.
    pub fn from_parts(
        path: Option<String>,
        name: Option<String>,
        size: Option<i64>,
    ) -> Option<Self> {
        match (path, name, size) {
            (Some(path), Some(name), Some(size)) => Some(Self { path, name, size }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Price in minor currency units
    pub price: i64,
    pub preview_pages: Option<i32>,
    /// Storage key of the original upload. Never rewritten by preview generation.
    pub file_path: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub preview: Option<PreviewArtifact>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether the source resolves to a PDF, by MIME type or file extension.
    pub fn is_pdf(&self) -> bool {
        self.file_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE)
            || self.file_type.eq_ignore_ascii_case(PDF_EXTENSION)
            || has_pdf_extension(&self.file_path)
    }

    /// Page count to request from the preview engine, falling back to `default`
    /// when unset and clamped to the accepted range.
    pub fn preview_page_count(&self, default: u32) -> u32 {
        self.preview_pages
            .and_then(|pages| u32::try_from(pages).ok())
            .unwrap_or(default)
            .clamp(MIN_PREVIEW_PAGES, MAX_PREVIEW_PAGES)
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }
}

/// Returns true if the path ends in `.pdf` (case-insensitive).
pub fn has_pdf_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

/// A file already written to storage, ready to be attached to a document.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub name: String,
    pub file_type: String,
    pub size: i64,
}

/// Fields for inserting a new document. Preview metadata always starts empty.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub preview_pages: Option<i32>,
    pub file: StoredFile,
    pub is_active: bool,
}

/// Partial update of a document's editable fields.
#[derive(Debug, Clone, Default)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub preview_pages: Option<i32>,
    pub is_active: Option<bool>,
    pub file: Option<StoredFile>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub preview_pages: Option<i32>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub preview_file_path: Option<String>,
    pub preview_file_name: Option<String>,
    pub preview_file_size: Option<i64>,
    pub has_preview: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        let has_preview = doc.has_preview();
        let (preview_file_path, preview_file_name, preview_file_size) = match doc.preview {
            Some(preview) => (Some(preview.path), Some(preview.name), Some(preview.size)),
            None => (None, None, None),
        };

        DocumentResponse {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            price: doc.price,
            preview_pages: doc.preview_pages,
            file_name: doc.file_name,
            file_type: doc.file_type,
            file_size: doc.file_size,
            preview_file_path,
            preview_file_name,
            preview_file_size,
            has_preview,
            is_active: doc.is_active,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_document() -> Document {
        Document {
            id: Uuid::new_v4(),
            title: "Quarterly report".to_string(),
            description: Some("Internal numbers".to_string()),
            price: 1500,
            preview_pages: Some(3),
            file_path: "documents/1700000000_report.pdf".to_string(),
            file_name: "report.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            file_size: 2048000,
            preview: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_response_without_preview() {
        let document = test_document();
        let response = DocumentResponse::from(document.clone());

        assert_eq!(response.id, document.id);
        assert_eq!(response.file_name, "report.pdf");
        assert!(!response.has_preview);
        assert!(response.preview_file_path.is_none());
        assert!(response.preview_file_name.is_none());
        assert!(response.preview_file_size.is_none());
    }

    #[test]
    fn test_document_response_with_preview() {
        let mut document = test_document();
        document.preview = Some(PreviewArtifact {
            path: "previews/preview_doc_1_1700000000.pdf".to_string(),
            name: "preview_doc_1_1700000000.pdf".to_string(),
            size: 4096,
        });

        let response = DocumentResponse::from(document);

        assert!(response.has_preview);
        assert_eq!(
            response.preview_file_path.as_deref(),
            Some("previews/preview_doc_1_1700000000.pdf")
        );
        assert_eq!(response.preview_file_size, Some(4096));
    }

    #[test]
    fn test_preview_artifact_requires_all_parts() {
        assert!(PreviewArtifact::from_parts(
            Some("previews/a.pdf".to_string()),
            Some("a.pdf".to_string()),
            None
        )
        .is_none());
        assert!(PreviewArtifact::from_parts(None, None, None).is_none());
        assert_eq!(
            PreviewArtifact::from_parts(
                Some("previews/a.pdf".to_string()),
                Some("a.pdf".to_string()),
                Some(10)
            )
            .map(|p| p.size),
            Some(10)
        );
    }

    #[test]
    fn test_is_pdf_by_type_or_extension() {
        let mut document = test_document();
        assert!(document.is_pdf());

        document.file_type = "application/octet-stream".to_string();
        assert!(document.is_pdf());

        document.file_path = "documents/1700000000_notes.docx".to_string();
        assert!(!document.is_pdf());
    }

    #[test]
    fn test_preview_page_count_defaults_and_clamps() {
        let mut document = test_document();
        document.preview_pages = None;
        assert_eq!(document.preview_page_count(3), 3);

        document.preview_pages = Some(25);
        assert_eq!(document.preview_page_count(3), MAX_PREVIEW_PAGES);

        document.preview_pages = Some(-4);
        assert_eq!(document.preview_page_count(3), 3);
    }

    #[test]
    fn test_has_pdf_extension() {
        assert!(has_pdf_extension("documents/a.PDF"));
        assert!(!has_pdf_extension("documents/a.pdf.txt"));
        assert!(!has_pdf_extension("documents/pdf"));
    }
}
