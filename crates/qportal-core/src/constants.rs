//! Shared constants

/// Pages included in a preview when the document does not configure a count.
pub const DEFAULT_PREVIEW_PAGES: u32 = 3;

/// Bounds accepted for `preview_pages` on a document.
pub const MIN_PREVIEW_PAGES: u32 = 1;
pub const MAX_PREVIEW_PAGES: u32 = 10;

/// Storage prefix for generated preview artifacts.
pub const PREVIEW_DIR: &str = "previews";

/// Storage prefix for uploaded source documents.
pub const DOCUMENT_DIR: &str = "documents";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PDF_EXTENSION: &str = "pdf";
