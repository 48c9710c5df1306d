pub mod document;

pub use document::{
    has_pdf_extension, Document, DocumentChanges, DocumentResponse, NewDocument, PreviewArtifact,
    StoredFile,
};
