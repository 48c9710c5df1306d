pub mod document_preview;
pub mod documents;
pub mod health;
pub mod preview_status;
