//! QPortal Processing Library
//!
//! PDF handling for uploaded documents:
//!
//! - [`preview`]: the preview engine (page import, text reflow and placeholder
//!   strategies tried in order) and the orchestrator that ties it to document
//!   records.
//! - [`document`]: format detection and PDF inspection of uploads.

pub mod document;
pub mod preview;

pub use document::{DocumentFormat, DocumentInspector, PdfMetadata};
pub use preview::{
    capabilities, EngineCapabilities, PreviewEngine, PreviewEngineConfig, PreviewError,
    PreviewOrchestrator, PreviewOutcome,
};
