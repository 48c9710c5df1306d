//! Operator tooling for the preview subsystem.
//!
//! Both binaries read the portal configuration from the environment and talk
//! to the database and storage directly.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use qportal_core::models::Document;
use qportal_core::PortalConfig;
use qportal_db::{setup_database, DocumentRepository, PgDocumentRepository};
use qportal_processing::{PreviewEngine, PreviewEngineConfig, PreviewOrchestrator};
use qportal_storage::{LocalStorage, Storage};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a byte count with thousands separators.
pub fn format_bytes(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Repository, storage and orchestrator wired from the environment.
pub struct PreviewTools {
    pub repository: Arc<dyn DocumentRepository>,
    pub storage: Arc<dyn Storage>,
    pub previews: PreviewOrchestrator,
}

impl PreviewTools {
    pub async fn from_env() -> Result<Self> {
        let config = PortalConfig::from_env().context("Failed to load configuration")?;
        config.validate().context("Configuration validation failed")?;

        let pool = setup_database(&config).await?;
        let storage = LocalStorage::new(
            config.local_storage_path.clone(),
            config.local_storage_base_url.clone(),
        )
        .await
        .context("Failed to initialize local storage")?;

        Ok(Self::new(
            &config,
            Arc::new(PgDocumentRepository::new(pool)),
            Arc::new(storage),
        ))
    }

    pub fn new(
        config: &PortalConfig,
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let engine = Arc::new(PreviewEngine::new(PreviewEngineConfig::from_settings(
            &config.preview,
        )));
        let previews = PreviewOrchestrator::new(
            repository.clone(),
            storage.clone(),
            engine,
            config.preview.default_pages,
        );

        Self {
            repository,
            storage,
            previews,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Regenerate the preview of each document, writing one progress line per
/// step to `out`. A missing source file counts as a failure.
pub async fn regenerate_all(
    tools: &PreviewTools,
    documents: &[Document],
    out: &mut impl Write,
) -> Result<RegenerationSummary> {
    let mut summary = RegenerationSummary::default();

    for document in documents {
        writeln!(
            out,
            "Processing document: {} (ID: {})",
            truncate_string(&document.title, 60),
            document.id
        )?;

        if !tools.storage.exists(&document.file_path).await.unwrap_or(false) {
            writeln!(out, "  ✗ File not found: {}", document.file_path)?;
            summary.failed += 1;
            continue;
        }

        if document.has_preview() {
            tools.previews.discard_preview(document).await;
            writeln!(out, "  ✓ Deleted old preview file")?;
        }

        let pages = tools.previews.page_count_for(document);
        let mut cleared = document.clone();
        cleared.preview = None;

        if tools.previews.generate_document_preview(&cleared, pages).await {
            let size = tools
                .repository
                .get_document(document.id)
                .await?
                .and_then(|d| d.preview)
                .map(|p| p.size)
                .unwrap_or_default();
            writeln!(
                out,
                "  ✓ Preview generated successfully ({} pages, {} bytes)",
                pages,
                format_bytes(size)
            )?;
            summary.succeeded += 1;
        } else {
            writeln!(out, "  ✗ Failed to generate preview")?;
            summary.failed += 1;
        }
    }

    Ok(summary)
}

/// [`regenerate_all`] writing to stdout. Each line takes the stdout lock on
/// its own, so log events emitted from blocking strategy threads are never
/// stuck behind it while a regeneration is awaited.
pub async fn regenerate_to_stdout(
    tools: &PreviewTools,
    documents: &[Document],
) -> Result<RegenerationSummary> {
    regenerate_all(tools, documents, &mut std::io::stdout()).await
}
