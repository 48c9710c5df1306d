use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::error::PreviewError;
use super::placeholder;
use super::source::SourceFile;
use super::RenderedPreview;

/// A strategy renders the first `page_count` pages of a source into memory.
pub type StrategyFn = fn(&SourceFile, u32) -> Result<RenderedPreview, PreviewError>;

#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: StrategyFn,
}

/// Strategies compiled into this build, in fallback order.
pub fn default_strategies() -> Vec<Strategy> {
    let mut strategies = Vec::with_capacity(3);
    #[cfg(feature = "page-import")]
    strategies.push(Strategy {
        name: "page_import",
        run: super::page_import::import_pages,
    });
    #[cfg(feature = "text-reflow")]
    strategies.push(Strategy {
        name: "text_reflow",
        run: super::text_reflow::reflow_text,
    });
    strategies.push(Strategy {
        name: "placeholder",
        run: placeholder::placeholder,
    });
    strategies
}

/// Which optional strategies are compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCapabilities {
    pub page_import: bool,
    pub text_reflow: bool,
}

pub const fn capabilities() -> EngineCapabilities {
    EngineCapabilities {
        page_import: cfg!(feature = "page-import"),
        text_reflow: cfg!(feature = "text-reflow"),
    }
}

#[derive(Debug, Clone)]
pub struct PreviewEngineConfig {
    /// Runtime switch; a disabled engine reports itself unavailable.
    pub enabled: bool,
    /// Upper bound for one strategy attempt. `None` runs strategies to completion.
    pub strategy_timeout: Option<Duration>,
}

impl Default for PreviewEngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl PreviewEngineConfig {
    pub fn from_settings(settings: &qportal_core::config::PreviewSettings) -> Self {
        Self {
            enabled: settings.enabled,
            strategy_timeout: (settings.strategy_timeout_secs > 0)
                .then(|| Duration::from_secs(settings.strategy_timeout_secs)),
        }
    }
}

/// Result of a successful engine run.
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub strategy: &'static str,
    pub pages: u32,
    pub total_pages: u32,
    pub file_size: u64,
    pub duration: Duration,
}

/// Produces preview PDFs by trying each strategy in order until one succeeds.
pub struct PreviewEngine {
    config: PreviewEngineConfig,
    strategies: Vec<Strategy>,
}

impl PreviewEngine {
    pub fn new(config: PreviewEngineConfig) -> Self {
        Self::with_strategies(config, default_strategies())
    }

    pub fn with_strategies(config: PreviewEngineConfig, strategies: Vec<Strategy>) -> Self {
        Self { config, strategies }
    }

    /// True when generation is enabled and the page import strategy is
    /// compiled in. Callers skip generation entirely when this is false.
    pub fn is_available(&self) -> bool {
        self.config.enabled && capabilities().page_import
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// Generate a preview of the first `page_count` pages of `source_path` at
    /// `output_path`. Never fails loudly: every error is logged and reported
    /// as `false`.
    #[tracing::instrument(skip(self), fields(source_path = %source_path.display(), output_path = %output_path.display()))]
    pub async fn generate_preview(
        &self,
        source_path: &Path,
        output_path: &Path,
        page_count: u32,
    ) -> bool {
        match self.try_generate(source_path, output_path, page_count).await {
            Ok(outcome) => {
                tracing::info!(
                    strategy = outcome.strategy,
                    requested_pages = page_count,
                    total_pages = outcome.total_pages,
                    pages_extracted = outcome.pages,
                    file_size = outcome.file_size,
                    duration_ms = outcome.duration.as_secs_f64() * 1000.0,
                    "PDF preview generated successfully"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    requested_pages = page_count,
                    error = %e,
                    "Error generating PDF preview"
                );
                false
            }
        }
    }

    /// Same as [`PreviewEngine::generate_preview`], reporting the outcome or
    /// the error that ended the run.
    pub async fn try_generate(
        &self,
        source_path: &Path,
        output_path: &Path,
        page_count: u32,
    ) -> Result<PreviewOutcome, PreviewError> {
        let start = Instant::now();
        let source = SourceFile::read(source_path).await?;
        let page_count = page_count.max(1);

        let mut last_error = PreviewError::StrategyUnavailable("no strategies configured");
        for strategy in &self.strategies {
            match self.run_strategy(*strategy, &source, page_count).await {
                Ok(rendered) => {
                    if rendered.bytes.is_empty() {
                        return Err(PreviewError::OutputWriteFailure(format!(
                            "{} produced an empty document",
                            strategy.name
                        )));
                    }
                    write_output(output_path, rendered.bytes).await?;
                    let file_size = verify_output(output_path).await?;

                    return Ok(PreviewOutcome {
                        strategy: strategy.name,
                        pages: rendered.pages,
                        total_pages: rendered.total_pages,
                        file_size,
                        duration: start.elapsed(),
                    });
                }
                Err(e) if e.should_fall_through() => {
                    tracing::warn!(
                        strategy = strategy.name,
                        error = %e,
                        "Preview strategy failed, trying next strategy"
                    );
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        source: &SourceFile,
        page_count: u32,
    ) -> Result<RenderedPreview, PreviewError> {
        let source = source.clone();
        let task = tokio::task::spawn_blocking(move || (strategy.run)(&source, page_count));

        let joined = match self.config.strategy_timeout {
            // A timed-out task keeps running on the blocking pool; its result
            // is dropped and never reaches the output path.
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| PreviewError::Timeout(limit))?,
            None => task.await,
        };

        joined.map_err(|e| {
            PreviewError::MalformedSource(format!("{} strategy aborted: {}", strategy.name, e))
        })?
    }
}

/// Write `bytes` to `output_path` through a temporary file in the same
/// directory, creating the directory if needed.
async fn write_output(output_path: &Path, bytes: Vec<u8>) -> Result<(), PreviewError> {
    let parent = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let output_path = output_path.to_path_buf();

    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        std::fs::create_dir_all(&parent)?;
        let mut file = tempfile::NamedTempFile::new_in(&parent)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(&output_path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| PreviewError::OutputWriteFailure(e.to_string()))?
    .map_err(|e| PreviewError::OutputWriteFailure(e.to_string()))
}

async fn verify_output(output_path: &Path) -> Result<u64, PreviewError> {
    match tokio::fs::metadata(output_path).await {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(PreviewError::OutputWriteFailure(
            "preview file is empty".to_string(),
        )),
        Err(e) => Err(PreviewError::OutputWriteFailure(format!(
            "preview file missing after write: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::test_fixtures::{deeply_linked_pdf, text_pdf};
    use lopdf::Document;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn fail_malformed(_: &SourceFile, _: u32) -> Result<RenderedPreview, PreviewError> {
        Err(PreviewError::MalformedSource("simulated parse failure".to_string()))
    }

    fn fail_empty(_: &SourceFile, _: u32) -> Result<RenderedPreview, PreviewError> {
        Err(PreviewError::EmptyDocument)
    }

    fn render_nothing(_: &SourceFile, _: u32) -> Result<RenderedPreview, PreviewError> {
        Ok(RenderedPreview {
            bytes: Vec::new(),
            pages: 1,
            total_pages: 1,
        })
    }

    fn slow(source: &SourceFile, pages: u32) -> Result<RenderedPreview, PreviewError> {
        std::thread::sleep(Duration::from_millis(500));
        placeholder::placeholder(source, pages)
    }

    static PLACEHOLDER_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_placeholder(source: &SourceFile, pages: u32) -> Result<RenderedPreview, PreviewError> {
        PLACEHOLDER_CALLS.fetch_add(1, Ordering::SeqCst);
        placeholder::placeholder(source, pages)
    }

    fn strategy(name: &'static str, run: StrategyFn) -> Strategy {
        Strategy { name, run }
    }

    async fn write_source(dir: &Path, name: &str, bytes: Vec<u8>) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await.unwrap();
        path
    }

    fn output_pages(path: &Path) -> usize {
        Document::load(path).unwrap().get_pages().len()
    }

    #[tokio::test]
    async fn test_generates_requested_page_count() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "ten.pdf", text_pdf(10)).await;
        let output = dir.path().join("previews/preview.pdf");

        let engine = PreviewEngine::new(PreviewEngineConfig::default());
        let outcome = engine.try_generate(&source, &output, 3).await.unwrap();

        assert_eq!(outcome.strategy, "page_import");
        assert_eq!(outcome.pages, 3);
        assert_eq!(output_pages(&output), 3);
        assert!(outcome.file_size > 0);
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let dir = tempdir().unwrap();
        let engine = PreviewEngine::new(PreviewEngineConfig::default());

        let output = dir.path().join("out.pdf");
        let err = engine
            .try_generate(&dir.path().join("missing.pdf"), &output, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, PreviewError::SourceMissing(_)));
        assert!(!output.exists());
        assert!(!engine.generate_preview(&dir.path().join("missing.pdf"), &output, 3).await);
    }

    #[cfg(feature = "text-reflow")]
    #[tokio::test]
    async fn test_falls_back_to_text_reflow() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "four.pdf", text_pdf(4)).await;
        let output = dir.path().join("out.pdf");

        let mut strategies = vec![strategy("page_import", fail_malformed)];
        strategies.extend(
            default_strategies()
                .into_iter()
                .filter(|s| s.name != "page_import"),
        );
        let engine = PreviewEngine::with_strategies(PreviewEngineConfig::default(), strategies);

        let outcome = engine.try_generate(&source, &output, 3).await.unwrap();
        assert_eq!(outcome.strategy, "text_reflow");
        assert_eq!(output_pages(&output), 3);
    }

    #[cfg(feature = "text-reflow")]
    #[tokio::test]
    async fn test_text_reflow_recovers_source_page_import_rejects() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "deep.pdf", deeply_linked_pdf(4, 200)).await;
        let output = dir.path().join("out.pdf");

        let engine = PreviewEngine::new(PreviewEngineConfig::default());
        let outcome = engine.try_generate(&source, &output, 3).await.unwrap();

        assert_eq!(outcome.strategy, "text_reflow");
        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.total_pages, 4);
        assert_eq!(output_pages(&output), 3);

        let preview = Document::load(&output).unwrap();
        let first_page = *preview.get_pages().values().next().unwrap();
        let content = preview.get_page_content(first_page).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("Page 1 body"));
    }

    #[tokio::test]
    async fn test_unparseable_source_gets_placeholder() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "junk.pdf", b"%PDF-1.4 this is not a pdf".to_vec()).await;
        let output = dir.path().join("out.pdf");

        let engine = PreviewEngine::new(PreviewEngineConfig::default());
        assert!(engine.generate_preview(&source, &output, 3).await);
        assert_eq!(output_pages(&output), 1);
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_empty_document_stops_the_chain() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "empty.pdf", text_pdf(1)).await;
        let output = dir.path().join("out.pdf");

        PLACEHOLDER_CALLS.store(0, Ordering::SeqCst);
        let engine = PreviewEngine::with_strategies(
            PreviewEngineConfig::default(),
            vec![
                strategy("page_import", fail_empty),
                strategy("placeholder", counting_placeholder),
            ],
        );

        let err = engine.try_generate(&source, &output, 3).await.unwrap_err();
        assert!(matches!(err, PreviewError::EmptyDocument));
        assert_eq!(PLACEHOLDER_CALLS.load(Ordering::SeqCst), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_empty_render_is_reported_as_failure() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "one.pdf", text_pdf(1)).await;
        let output = dir.path().join("out.pdf");

        let engine = PreviewEngine::with_strategies(
            PreviewEngineConfig::default(),
            vec![strategy("broken", render_nothing)],
        );

        assert!(!engine.generate_preview(&source, &output, 1).await);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_slow_strategy_times_out_and_falls_through() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "one.pdf", text_pdf(1)).await;
        let output = dir.path().join("out.pdf");

        let engine = PreviewEngine::with_strategies(
            PreviewEngineConfig {
                enabled: true,
                strategy_timeout: Some(Duration::from_millis(50)),
            },
            vec![
                strategy("slow", slow),
                strategy("placeholder", placeholder::placeholder),
            ],
        );

        let outcome = engine.try_generate(&source, &output, 1).await.unwrap();
        assert_eq!(outcome.strategy, "placeholder");
    }

    #[tokio::test]
    async fn test_existing_output_is_replaced() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "five.pdf", text_pdf(5)).await;
        let output = write_source(dir.path(), "out.pdf", b"stale".to_vec()).await;

        let engine = PreviewEngine::new(PreviewEngineConfig::default());
        assert!(engine.generate_preview(&source, &output, 2).await);
        assert_eq!(output_pages(&output), 2);
    }

    #[test]
    fn test_availability_follows_config() {
        let engine = PreviewEngine::new(PreviewEngineConfig::default());
        assert_eq!(engine.is_available(), capabilities().page_import);

        let disabled = PreviewEngine::new(PreviewEngineConfig {
            enabled: false,
            strategy_timeout: None,
        });
        assert!(!disabled.is_available());
    }

    #[test]
    fn test_default_strategy_order() {
        let engine = PreviewEngine::new(PreviewEngineConfig::default());
        assert_eq!(
            engine.strategy_names(),
            vec!["page_import", "text_reflow", "placeholder"]
        );
    }
}
