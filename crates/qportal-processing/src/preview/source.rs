use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};

use super::error::PreviewError;

/// A source PDF read into memory, with the file metadata the placeholder
/// page reports.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub bytes: Arc<Vec<u8>>,
    pub modified: Option<DateTime<Local>>,
}

impl SourceFile {
    /// Read `path` fully; the file handle is closed before returning.
    pub async fn read(path: &Path) -> Result<Self, PreviewError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Err(PreviewError::SourceMissing(path.to_path_buf())),
        };
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PreviewError::SourceMissing(path.to_path_buf()),
            _ => PreviewError::MalformedSource(format!("Failed to read source: {}", e)),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            bytes: Arc::new(bytes),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        })
    }

    /// In-memory source, for callers that already hold the bytes.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes: Arc::new(bytes),
            modified: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
