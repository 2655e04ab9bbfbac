use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use folio_core::models::{AssetFilter, MediaAsset, RestoreOutcome, VariantUpdate};
use folio_core::AppError;
use uuid::Uuid;

/// Persistence for media assets.
///
/// Every write is a single-row statement, so concurrent lifecycle operations on
/// the same asset serialize in the store. Soft-deleted rows are hidden unless a
/// method says otherwise.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Persist a new asset. Fails with `DuplicateKey` if the id or storage key exists.
    async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError>;

    async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Option<MediaAsset>, AppError>;

    /// Newest first by `created_at`.
    async fn list(
        &self,
        filter: &AssetFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MediaAsset>, AppError>;

    async fn count(&self, filter: &AssetFilter) -> Result<i64, AppError>;

    /// Soft-deleted assets, most recently deleted first.
    async fn list_deleted(&self, limit: i64, offset: i64) -> Result<Vec<MediaAsset>, AppError>;

    async fn count_deleted(&self) -> Result<i64, AppError>;

    /// Set or clear alt text on an active asset.
    async fn update_alt_text(
        &self,
        id: Uuid,
        alt_text: Option<String>,
    ) -> Result<Option<MediaAsset>, AppError>;

    /// Record processing results. Applies to soft-deleted rows as well;
    /// returns `false` when the row no longer exists.
    async fn update_variants(&self, id: Uuid, update: VariantUpdate) -> Result<bool, AppError>;

    /// Tombstone an asset. Repeating refreshes `deleted_at`.
    async fn soft_delete(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError>;

    async fn restore(&self, id: Uuid) -> Result<RestoreOutcome, AppError>;

    /// Remove the row regardless of state.
    async fn purge(&self, id: Uuid) -> Result<bool, AppError>;

    /// Remove the row only if it is still soft-deleted before `cutoff`.
    async fn purge_if_deleted_before(
        &self,
        id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Soft-deleted before `cutoff`, oldest deletion first.
    async fn list_soft_deleted_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaAsset>, AppError>;

    async fn count_soft_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError>;

    /// Soft-deleted longer than `retention_days` ago.
    async fn list_expired_soft_deleted(
        &self,
        retention_days: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        self.list_soft_deleted_before(retention_cutoff(Utc::now(), retention_days))
            .await
    }
}

/// Moment before which a soft-deleted asset is expired.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - Duration::days(retention_days)
}
