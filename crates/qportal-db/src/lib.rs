//! QPortal Database Layer
//!
//! Document persistence behind the `DocumentRepository` trait, with a
//! PostgreSQL implementation and, under the `test-helpers` feature, an
//! in-memory one.

pub mod document;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod pool;

pub use document::{DocumentRepository, PgDocumentRepository};
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemoryDocumentRepository;
pub use pool::setup_database;
