use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use folio_core::AppError;
use folio_db::{retention_cutoff, AssetRepository};
use folio_storage::Storage;
use serde::Serialize;
use tokio::time::interval;
use uuid::Uuid;

use crate::files::remove_asset_files;

/// One asset the cleanup pass could not purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupItemError {
    pub id: Uuid,
    pub storage_key: String,
    pub reason: String,
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Rows purged.
    pub cleaned: usize,
    /// Rows restored or purged by someone else mid-pass.
    pub skipped: usize,
    /// Rows whose purge failed.
    pub failed: usize,
    /// Files that could not be removed after their row was purged.
    pub orphaned_files: usize,
    pub errors: Vec<CleanupItemError>,
}

/// Purges soft-deleted assets past their retention period.
#[derive(Clone)]
pub struct CleanupService {
    repository: Arc<dyn AssetRepository>,
    storage: Arc<dyn Storage>,
}

impl CleanupService {
    pub fn new(repository: Arc<dyn AssetRepository>, storage: Arc<dyn Storage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Start a background task running a pass every `every`.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>, every: Duration, retention_days: i64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut cleanup_interval = interval(every);

            loop {
                cleanup_interval.tick().await;

                tracing::info!(retention_days, "Starting scheduled cleanup of expired media");

                match self.run_cleanup(retention_days).await {
                    Ok(report) if report.failed > 0 => {
                        tracing::warn!(
                            cleaned = report.cleaned,
                            failed = report.failed,
                            "Cleanup pass finished with failures"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Cleanup task failed");
                    }
                }
            }
        })
    }

    /// Purge every asset soft-deleted more than `retention_days` ago.
    pub async fn run_cleanup(&self, retention_days: i64) -> Result<CleanupReport, AppError> {
        self.run_cleanup_before(retention_cutoff(Utc::now(), retention_days))
            .await
    }

    /// Number of assets a pass with `retention_days` would purge.
    pub async fn dry_run_count(&self, retention_days: i64) -> Result<usize, AppError> {
        let cutoff = retention_cutoff(Utc::now(), retention_days);
        let count = self.repository.count_soft_deleted_before(cutoff).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Purge every asset soft-deleted before `cutoff`.
    ///
    /// Each row is purged with a conditional delete before its files are
    /// touched, so an asset restored mid-pass keeps its files.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "expire_soft_deleted"))]
    pub async fn run_cleanup_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<CleanupReport, AppError> {
        let start = std::time::Instant::now();
        let expired = self.repository.list_soft_deleted_before(cutoff).await?;
        let mut report = CleanupReport::default();

        for asset in expired {
            tracing::debug!(
                media_id = %asset.id,
                storage_key = %asset.storage_key,
                deleted_at = ?asset.deleted_at,
                "Purging expired media"
            );

            match self.repository.purge_if_deleted_before(asset.id, cutoff).await {
                Ok(true) => {
                    report.orphaned_files += remove_asset_files(self.storage.as_ref(), &asset).await;
                    report.cleaned += 1;
                }
                Ok(false) => {
                    tracing::info!(
                        media_id = %asset.id,
                        "Media restored or purged concurrently, skipping"
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(
                        media_id = %asset.id,
                        storage_key = %asset.storage_key,
                        error = %e,
                        "Failed to purge expired media"
                    );
                    report.failed += 1;
                    report.errors.push(CleanupItemError {
                        id: asset.id,
                        storage_key: asset.storage_key.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            cleaned = report.cleaned,
            skipped = report.skipped,
            failed = report.failed,
            orphaned_files = report.orphaned_files,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cleanup completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use crate::upload::IncomingFile;
    use bytes::Bytes;
    use chrono::Duration as ChronoDuration;
    use async_trait::async_trait;
    use folio_core::models::{AssetFilter, MediaAsset, RestoreOutcome, VariantUpdate};
    use folio_core::Validator;
    use folio_db::MemoryAssetRepository;

    async fn trashed_svg(ctx: &TestContext, days_ago: i64) -> MediaAsset {
        let uploaded = ctx
            .upload_service(Validator::default())
            .upload(IncomingFile {
                filename: "logo.svg".to_string(),
                content_type: "image/svg+xml".to_string(),
                data: Bytes::from_static(b"<svg/>"),
            })
            .await
            .unwrap();
        let id = uploaded.asset.id;
        ctx.repo.soft_delete(id).await.unwrap();
        ctx.repo
            .set_deleted_at(id, Some(Utc::now() - ChronoDuration::days(days_ago)));
        uploaded.asset
    }

    #[tokio::test]
    async fn test_expired_assets_are_purged_with_files() {
        let ctx = TestContext::new().await;
        let cleanup = ctx.cleanup_service();
        let old = trashed_svg(&ctx, 31).await;
        let recent = trashed_svg(&ctx, 29).await;

        assert_eq!(cleanup.dry_run_count(30).await.unwrap(), 1);

        let report = cleanup.run_cleanup(30).await.unwrap();
        assert_eq!(report.cleaned, 1);
        assert_eq!(report.failed, 0);
        assert!(report.errors.is_empty());

        assert!(ctx.repo.get(old.id, true).await.unwrap().is_none());
        assert!(!ctx.storage.exists(&old.storage_key).await.unwrap());
        assert!(ctx.repo.get(recent.id, true).await.unwrap().is_some());
        assert!(ctx.storage.exists(&recent.storage_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let ctx = TestContext::new().await;
        let cleanup = ctx.cleanup_service();
        trashed_svg(&ctx, 40).await;
        trashed_svg(&ctx, 50).await;

        assert_eq!(cleanup.run_cleanup(30).await.unwrap().cleaned, 2);
        assert_eq!(cleanup.run_cleanup(30).await.unwrap(), CleanupReport::default());
    }

    #[tokio::test]
    async fn test_active_assets_are_never_touched() {
        let ctx = TestContext::new().await;
        let cleanup = ctx.cleanup_service();
        let uploaded = ctx
            .upload_service(Validator::default())
            .upload(IncomingFile {
                filename: "cv.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.4"),
            })
            .await
            .unwrap();

        let report = cleanup
            .run_cleanup_before(Utc::now() + ChronoDuration::days(365))
            .await
            .unwrap();
        assert_eq!(report.cleaned, 0);
        assert!(ctx.repo.get(uploaded.asset.id, false).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_purge_is_reported_and_batch_continues() {
        let ctx = TestContext::new().await;
        let cleanup = ctx.cleanup_service();
        let failing = trashed_svg(&ctx, 40).await;
        let ok = trashed_svg(&ctx, 41).await;
        ctx.repo.fail_purge_for(failing.id);

        let report = cleanup.run_cleanup(30).await.unwrap();
        assert_eq!(report.cleaned, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id, failing.id);
        assert_eq!(report.errors[0].storage_key, failing.storage_key);

        assert!(ctx.storage.exists(&failing.storage_key).await.unwrap());
        assert!(ctx.repo.get(ok.id, true).await.unwrap().is_none());
    }

    /// Restores every row right after it is listed, like an admin racing the job.
    struct RestoreAfterListing(MemoryAssetRepository);

    #[async_trait]
    impl AssetRepository for RestoreAfterListing {
        async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError> {
            self.0.insert(asset).await
        }
        async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Option<MediaAsset>, AppError> {
            self.0.get(id, include_deleted).await
        }
        async fn list(&self, filter: &AssetFilter, limit: i64, offset: i64) -> Result<Vec<MediaAsset>, AppError> {
            self.0.list(filter, limit, offset).await
        }
        async fn count(&self, filter: &AssetFilter) -> Result<i64, AppError> {
            self.0.count(filter).await
        }
        async fn list_deleted(&self, limit: i64, offset: i64) -> Result<Vec<MediaAsset>, AppError> {
            self.0.list_deleted(limit, offset).await
        }
        async fn count_deleted(&self) -> Result<i64, AppError> {
            self.0.count_deleted().await
        }
        async fn update_alt_text(&self, id: Uuid, alt_text: Option<String>) -> Result<Option<MediaAsset>, AppError> {
            self.0.update_alt_text(id, alt_text).await
        }
        async fn update_variants(&self, id: Uuid, update: VariantUpdate) -> Result<bool, AppError> {
            self.0.update_variants(id, update).await
        }
        async fn soft_delete(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
            self.0.soft_delete(id).await
        }
        async fn restore(&self, id: Uuid) -> Result<RestoreOutcome, AppError> {
            self.0.restore(id).await
        }
        async fn purge(&self, id: Uuid) -> Result<bool, AppError> {
            self.0.purge(id).await
        }
        async fn purge_if_deleted_before(&self, id: Uuid, cutoff: DateTime<Utc>) -> Result<bool, AppError> {
            self.0.purge_if_deleted_before(id, cutoff).await
        }
        async fn list_soft_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<MediaAsset>, AppError> {
            let listed = self.0.list_soft_deleted_before(cutoff).await?;
            for asset in &listed {
                self.0.restore(asset.id).await?;
            }
            Ok(listed)
        }
        async fn count_soft_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
            self.0.count_soft_deleted_before(cutoff).await
        }
    }

    #[tokio::test]
    async fn test_restored_between_listing_and_purge_is_skipped() {
        let ctx = TestContext::new().await;
        let old = trashed_svg(&ctx, 40).await;

        let cleanup = CleanupService::new(
            Arc::new(RestoreAfterListing(ctx.repo.clone())),
            ctx.storage.clone(),
        );
        let report = cleanup.run_cleanup(30).await.unwrap();

        assert_eq!(report.cleaned, 0);
        assert_eq!(report.skipped, 1);
        assert!(ctx.repo.get(old.id, false).await.unwrap().is_some());
        assert!(ctx.storage.exists(&old.storage_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_report_serializes_camel_case() {
        let report = CleanupReport {
            cleaned: 1,
            orphaned_files: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cleaned"], 1);
        assert_eq!(json["orphanedFiles"], 2);
    }
}
