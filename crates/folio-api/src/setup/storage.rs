//! Storage setup and initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_core::Config;
use folio_storage::{LocalStorage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(
        config.storage_path().to_path_buf(),
        config.public_base_url().to_string(),
    )
    .await
    .with_context(|| {
        format!(
            "Failed to initialize storage at {}",
            config.storage_path().display()
        )
    })?;

    tracing::info!(
        storage_path = %storage.base_path().display(),
        public_base_url = %config.public_base_url(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
