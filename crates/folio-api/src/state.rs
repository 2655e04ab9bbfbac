//! Application state shared by every handler.

use std::sync::Arc;

use folio_core::Validator;
use folio_db::AssetRepository;
use folio_processing::VariantProcessor;
use folio_services::{CleanupService, LifecycleService, MediaUploadService};
use folio_storage::Storage;

pub struct AppState {
    /// Reads and alt-text edits go straight to the repository.
    pub repository: Arc<dyn AssetRepository>,
    pub upload: MediaUploadService,
    pub lifecycle: LifecycleService,
    pub cleanup: Arc<CleanupService>,
    /// Base for the `url` fields of asset responses.
    pub public_base_url: String,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        storage: Arc<dyn Storage>,
        validator: Validator,
        public_base_url: impl Into<String>,
    ) -> Self {
        let processor = VariantProcessor::new(storage.clone());
        Self {
            upload: MediaUploadService::new(
                repository.clone(),
                storage.clone(),
                processor,
                validator,
            ),
            lifecycle: LifecycleService::new(repository.clone(), storage.clone()),
            cleanup: Arc::new(CleanupService::new(repository.clone(), storage)),
            repository,
            public_base_url: public_base_url.into(),
        }
    }
}
