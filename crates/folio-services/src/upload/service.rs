//! Media upload service
//!
//! validate → key → write original → insert → respond, then (raster only)
//! generate variants on a detached task that reports back through
//! `update_variants`.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use crate::files::remove_keys;
use folio_core::models::MediaAsset;
use folio_core::{AppError, SupportedMime, Validator};
use folio_db::AssetRepository;
use folio_processing::VariantProcessor;
use folio_storage::{new_key, Storage};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Result of a successful upload.
///
/// `processing` is the detached variant task for raster uploads. Request
/// handlers drop it; tests may await it to observe the settled state.
#[derive(Debug)]
pub struct UploadedAsset {
    pub asset: MediaAsset,
    pub processing: Option<JoinHandle<()>>,
}

pub struct MediaUploadService {
    repository: Arc<dyn AssetRepository>,
    storage: Arc<dyn Storage>,
    processor: VariantProcessor,
    validator: Validator,
}

impl MediaUploadService {
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        storage: Arc<dyn Storage>,
        processor: VariantProcessor,
        validator: Validator,
    ) -> Self {
        Self {
            repository,
            storage,
            processor,
            validator,
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    #[tracing::instrument(skip(self, file), fields(filename = %file.filename, content_type = %file.content_type, size_bytes = file.data.len()))]
    pub async fn upload(&self, file: IncomingFile) -> Result<UploadedAsset, AppError> {
        let start = Instant::now();

        // 1. Validate before touching storage
        let mime = self
            .validator
            .validate(&file.content_type, file.data.len() as u64)?;

        // 2. Write the original
        let storage_key = new_key(&file.filename);
        let size = file.data.len() as i64;
        self.storage
            .write(&storage_key, file.data, mime.as_str())
            .await?;

        // 3. Persist the record
        let asset = MediaAsset::new(file.filename, mime, size, storage_key.clone());
        let asset = match self.repository.insert(asset).await {
            Ok(asset) => asset,
            Err(e) => {
                if let Err(remove_err) = self.storage.remove(&storage_key).await {
                    tracing::error!(
                        storage_key = %storage_key,
                        error = %remove_err,
                        "Failed to remove original after insert failure"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            media_id = %asset.id,
            storage_key = %asset.storage_key,
            mime_type = %asset.mime_type,
            size_bytes = asset.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media uploaded"
        );

        // 4. Fire-and-forget variant generation
        let processing = mime
            .is_raster()
            .then(|| self.spawn_variants(asset.id, asset.storage_key.clone(), mime));

        Ok(UploadedAsset { asset, processing })
    }

    fn spawn_variants(&self, id: Uuid, storage_key: String, mime: SupportedMime) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let storage = self.storage.clone();
        let processor = self.processor.clone();

        tokio::spawn(async move {
            let Some(update) = processor.process(&storage_key, mime).await else {
                return;
            };
            let written: Vec<String> = update.variants.values().map(|v| v.path.clone()).collect();

            match repository.update_variants(id, update).await {
                Ok(true) => {
                    tracing::debug!(media_id = %id, "Variants recorded");
                    return;
                }
                Ok(false) => {
                    tracing::info!(
                        media_id = %id,
                        storage_key = %storage_key,
                        "Asset purged before variants were recorded, removing renditions"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        media_id = %id,
                        error = %e,
                        "Failed to record variants, removing renditions"
                    );
                }
            }

            remove_keys(storage.as_ref(), id, written).await;
        })
    }
}
