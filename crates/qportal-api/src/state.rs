use std::sync::Arc;

use qportal_core::PortalConfig;
use qportal_db::DocumentRepository;
use qportal_processing::{PreviewEngine, PreviewEngineConfig, PreviewOrchestrator};
use qportal_storage::Storage;

use crate::services::DocumentLifecycleService;

/// Shared handler state
pub struct AppState {
    pub config: PortalConfig,
    pub repository: Arc<dyn DocumentRepository>,
    pub storage: Arc<dyn Storage>,
    pub previews: Arc<PreviewOrchestrator>,
    pub documents: DocumentLifecycleService,
}

impl AppState {
    /// Wire the preview engine and lifecycle service around the given
    /// repository and storage backend.
    pub fn new(
        config: PortalConfig,
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
    ) -> Arc<Self> {
        let engine = Arc::new(PreviewEngine::new(PreviewEngineConfig::from_settings(
            &config.preview,
        )));
        let previews = Arc::new(PreviewOrchestrator::new(
            repository.clone(),
            storage.clone(),
            engine,
            config.preview.default_pages,
        ));
        let documents =
            DocumentLifecycleService::new(repository.clone(), storage.clone(), previews.clone());

        Arc::new(Self {
            config,
            repository,
            storage,
            previews,
            documents,
        })
    }
}
