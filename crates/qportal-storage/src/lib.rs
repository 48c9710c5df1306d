//! QPortal Storage Library
//!
//! Storage abstraction for uploaded documents and generated previews. The
//! `Storage` trait doubles as the source locator for the preview engine:
//! `resolve_path` maps a stored key to the file the engine reads.
//!
//! # Storage key format
//!
//! - **Uploaded documents**: `documents/{unix_secs}_{file_name}`
//! - **Preview artifacts**: `previews/preview_doc_{document_id}_{unix_secs}.pdf`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

pub use keys::{document_key, file_name_of, preview_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
