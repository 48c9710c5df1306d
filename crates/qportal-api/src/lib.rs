//! QPortal API Library
//!
//! HTTP surface for paid documents: upload and edit documents, serve their
//! previews, and report what the preview engine can do.

pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use services::DocumentLifecycleService;
pub use state::AppState;
