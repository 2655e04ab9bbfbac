//! Soft-delete lifecycle: trash, restore and permanent delete.

use std::sync::Arc;

use chrono::{Duration, Utc};
use folio_core::models::{MediaAsset, RestoreOutcome};
use folio_core::AppError;
use folio_db::AssetRepository;
use folio_storage::Storage;
use uuid::Uuid;

use crate::files::remove_asset_files;

#[derive(Clone)]
pub struct LifecycleService {
    repository: Arc<dyn AssetRepository>,
    storage: Arc<dyn Storage>,
}

impl LifecycleService {
    pub fn new(repository: Arc<dyn AssetRepository>, storage: Arc<dyn Storage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Move an asset to the trash. Files stay in place.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn soft_delete(&self, id: Uuid) -> Result<MediaAsset, AppError> {
        let asset = self
            .repository
            .soft_delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

        tracing::info!(media_id = %id, deleted_at = ?asset.deleted_at, "Media moved to trash");
        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn restore(&self, id: Uuid) -> Result<MediaAsset, AppError> {
        match self.repository.restore(id).await? {
            RestoreOutcome::Restored(asset) => {
                tracing::info!(media_id = %id, "Media restored from trash");
                Ok(asset)
            }
            RestoreOutcome::NotDeleted => Err(AppError::NotDeleted(
                "Media is not in the trash".to_string(),
            )),
            RestoreOutcome::NotFound => Err(AppError::NotFound("Media not found".to_string())),
        }
    }

    /// Permanently delete a trashed asset: the row first, then its files.
    ///
    /// The purge re-checks the tombstone inside the delete, so an asset restored
    /// concurrently is left alone and reported as not deleted.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn purge(&self, id: Uuid) -> Result<MediaAsset, AppError> {
        let asset = self
            .repository
            .get(id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

        if !asset.is_deleted() {
            return Err(AppError::NotDeleted(
                "Only media in the trash can be permanently deleted".to_string(),
            ));
        }

        // Any tombstone qualifies; the slack absorbs clock skew with the store.
        let any_tombstone = Utc::now() + Duration::days(1);
        if !self
            .repository
            .purge_if_deleted_before(id, any_tombstone)
            .await?
        {
            return Err(AppError::NotDeleted(
                "Only media in the trash can be permanently deleted".to_string(),
            ));
        }

        let orphaned = remove_asset_files(self.storage.as_ref(), &asset).await;
        tracing::info!(
            media_id = %id,
            storage_key = %asset.storage_key,
            orphaned_files = orphaned,
            "Media permanently deleted"
        );

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png_bytes, TestContext};
    use crate::upload::IncomingFile;
    use bytes::Bytes;
    use folio_core::Validator;

    async fn uploaded_png(ctx: &TestContext) -> MediaAsset {
        let uploaded = ctx
            .upload_service(Validator::default())
            .upload(IncomingFile {
                filename: "a.png".to_string(),
                content_type: "image/png".to_string(),
                data: Bytes::from(png_bytes(300, 200)),
            })
            .await
            .unwrap();
        uploaded.processing.unwrap().await.unwrap();
        ctx.repo.get(uploaded.asset.id, false).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_delete_restore_preserves_state() {
        let ctx = TestContext::new().await;
        let lifecycle = ctx.lifecycle_service();
        let asset = uploaded_png(&ctx).await;

        lifecycle.soft_delete(asset.id).await.unwrap();
        assert!(ctx.repo.get(asset.id, false).await.unwrap().is_none());
        assert_eq!(ctx.stored_files().len(), 4);

        let restored = lifecycle.restore(asset.id).await.unwrap();
        assert_eq!(restored, asset);
    }

    #[tokio::test]
    async fn test_restore_active_is_not_deleted() {
        let ctx = TestContext::new().await;
        let lifecycle = ctx.lifecycle_service();
        let asset = uploaded_png(&ctx).await;

        let err = lifecycle.restore(asset.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotDeleted(_)));

        let err = lifecycle.restore(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_purge_requires_trash_and_removes_files() {
        let ctx = TestContext::new().await;
        let lifecycle = ctx.lifecycle_service();
        let asset = uploaded_png(&ctx).await;

        let err = lifecycle.purge(asset.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotDeleted(_)));

        lifecycle.soft_delete(asset.id).await.unwrap();
        lifecycle.purge(asset.id).await.unwrap();

        assert!(ctx.repo.get(asset.id, true).await.unwrap().is_none());
        assert!(ctx.stored_files().is_empty());

        let err = lifecycle.purge(asset.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
