//! Shared key generation for stored files.

use qportal_core::constants::{DOCUMENT_DIR, PREVIEW_DIR};
use uuid::Uuid;

/// Key for a preview artifact of `document_id` generated at `timestamp` (Unix seconds).
///
/// Two regenerations within the same second produce the same key; the later
/// write replaces the earlier file.
pub fn preview_key(document_id: Uuid, timestamp: i64) -> String {
    format!("{}/preview_doc_{}_{}.pdf", PREVIEW_DIR, document_id, timestamp)
}

/// Key for an uploaded document. Only the final path component of
/// `original_name` is kept and characters outside `[A-Za-z0-9._-]` become `_`.
pub fn document_key(timestamp: i64, original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", "_");
    }
    if sanitized.trim_matches('.').is_empty() {
        sanitized = "upload".to_string();
    }

    format!("{}/{}_{}", DOCUMENT_DIR, timestamp, sanitized)
}

/// Last path segment of a storage key.
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
