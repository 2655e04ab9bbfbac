//! File removal shared by permanent delete, cleanup and variant processing.

use folio_core::models::MediaAsset;
use folio_processing::DEFAULT_VARIANTS;
use folio_storage::{variant_key, Storage};
use uuid::Uuid;

/// Every key `asset` may own on disk.
///
/// Raster assets also list the derived key of every default rendition, so files
/// written by a processing task that never got recorded are still found.
pub fn asset_file_keys(asset: &MediaAsset) -> Vec<String> {
    let mut keys = asset.storage_keys();
    if asset.supported_mime().is_some_and(|m| m.is_raster()) {
        for spec in DEFAULT_VARIANTS.iter() {
            let key = variant_key(&asset.storage_key, spec.name);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

/// Remove the original and every rendition of `asset`.
///
/// Best-effort: failures are logged and counted, never returned. Missing
/// files are not failures.
pub async fn remove_asset_files(storage: &dyn Storage, asset: &MediaAsset) -> usize {
    remove_keys(storage, asset.id, asset_file_keys(asset)).await
}

/// Remove `keys` belonging to `media_id`, returning the number of failures.
pub async fn remove_keys<I>(storage: &dyn Storage, media_id: Uuid, keys: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    let mut failures = 0;
    for key in keys {
        if let Err(e) = storage.remove(&key).await {
            failures += 1;
            tracing::error!(
                media_id = %media_id,
                storage_key = %key,
                error = %e,
                "Failed to remove file, leaving it orphaned"
            );
        }
    }
    failures
}
