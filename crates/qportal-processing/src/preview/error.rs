use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Preview generation errors
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Preview strategy unavailable: {0}")]
    StrategyUnavailable(&'static str),

    #[error("Malformed source PDF: {0}")]
    MalformedSource(String),

    #[error("Source PDF has no pages")]
    EmptyDocument,

    #[error("Preview strategy timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to write preview output: {0}")]
    OutputWriteFailure(String),
}

impl PreviewError {
    /// Whether the next strategy in the chain should be tried after this error.
    ///
    /// A source that parses but has no pages, or an output that cannot be
    /// written, will not get better with another strategy.
    pub fn should_fall_through(&self) -> bool {
        matches!(
            self,
            PreviewError::MalformedSource(_)
                | PreviewError::Timeout(_)
                | PreviewError::StrategyUnavailable(_)
        )
    }
}

impl From<lopdf::Error> for PreviewError {
    fn from(err: lopdf::Error) -> Self {
        PreviewError::MalformedSource(err.to_string())
    }
}
