pub mod document_lifecycle;

pub use document_lifecycle::{CreateDocument, DocumentLifecycleService, UpdateDocument, UploadedFile};
