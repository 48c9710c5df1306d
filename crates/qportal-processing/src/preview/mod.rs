//! Preview generation
//!
//! A preview is a standalone PDF holding only the first pages of a paid
//! document. [`PreviewEngine`] produces the file from a source path and
//! [`PreviewOrchestrator`] records the result on the document.

mod engine;
mod error;
mod layout;
mod orchestration;
#[cfg(feature = "page-import")]
mod page_import;
mod placeholder;
mod source;
#[cfg(test)]
pub(crate) mod test_fixtures;
#[cfg(feature = "text-reflow")]
mod text_reflow;

pub use engine::{
    capabilities, default_strategies, EngineCapabilities, PreviewEngine, PreviewEngineConfig,
    PreviewOutcome, Strategy, StrategyFn,
};
pub use error::PreviewError;
pub use orchestration::PreviewOrchestrator;
pub use source::SourceFile;

/// PDF bytes produced by one strategy, held in memory until the engine
/// commits them to the output path.
#[derive(Debug)]
pub struct RenderedPreview {
    pub bytes: Vec<u8>,
    /// Pages in the rendered document
    pub pages: u32,
    /// Pages found in the source; zero when the strategy did not read it
    pub total_pages: u32,
}

/// Whether the text reflow strategy can parse the file at `path`.
pub async fn can_process_with_text_reflow(path: &std::path::Path) -> bool {
    #[cfg(feature = "text-reflow")]
    {
        let Ok(source) = SourceFile::read(path).await else {
            return false;
        };
        tokio::task::spawn_blocking(move || text_reflow::can_extract(&source.bytes))
            .await
            .unwrap_or(false)
    }
    #[cfg(not(feature = "text-reflow"))]
    {
        let _ = path;
        false
    }
}
