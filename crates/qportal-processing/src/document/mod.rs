//! Upload inspection

pub mod inspector;

pub use inspector::{DocumentFormat, DocumentInspector, PdfMetadata};
