//! Application setup and initialization

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use qportal_core::PortalConfig;
use qportal_db::{setup_database, PgDocumentRepository};
use qportal_storage::LocalStorage;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: PortalConfig) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_tracing();

    config.validate().context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let pool = setup_database(&config).await?;

    let storage = LocalStorage::new(
        config.local_storage_path.clone(),
        config.local_storage_base_url.clone(),
    )
    .await
    .context("Failed to initialize local storage")?;
    tracing::info!(path = %config.local_storage_path, "Local storage initialized");

    let state = AppState::new(
        config.clone(),
        Arc::new(PgDocumentRepository::new(pool)),
        Arc::new(storage),
    );

    let capabilities = qportal_processing::capabilities();
    tracing::info!(
        available = state.previews.is_available(),
        page_import = capabilities.page_import,
        text_reflow = capabilities.text_reflow,
        default_pages = config.preview.default_pages,
        "Preview engine configured"
    );

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
