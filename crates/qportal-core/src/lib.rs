//! QPortal Core Library
//!
//! Domain models, error types, configuration and constants shared by every
//! QPortal component: the storage layer, the document repository, the preview
//! engine, the HTTP API and the operator tooling.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::PortalConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
