//! In-memory asset repository for tests.
//!
//! Mirrors the Postgres semantics closely enough for service and HTTP tests to
//! run without a database. Each method takes the lock once, which gives the
//! same single-statement atomicity as the SQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::models::{AssetFilter, MediaAsset, RestoreOutcome, VariantUpdate};
use folio_core::AppError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::repository::AssetRepository;

#[derive(Default)]
struct State {
    assets: HashMap<Uuid, MediaAsset>,
    fail_inserts: bool,
    fail_variant_updates: bool,
    fail_purges: HashSet<Uuid>,
}

/// Mock asset repository backed by a `HashMap`.
#[derive(Clone, Default)]
pub struct MemoryAssetRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrite the tombstone timestamp, e.g. to simulate an old deletion.
    pub fn set_deleted_at(&self, id: Uuid, deleted_at: Option<DateTime<Utc>>) -> bool {
        match self.lock().assets.get_mut(&id) {
            Some(asset) => {
                asset.deleted_at = deleted_at;
                true
            }
            None => false,
        }
    }

    /// Make every subsequent `insert` fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.lock().fail_inserts = fail;
    }

    /// Make every subsequent `update_variants` fail with a database error.
    pub fn fail_variant_updates(&self, fail: bool) {
        self.lock().fail_variant_updates = fail;
    }

    /// Make purges of `id` fail with a database error.
    pub fn fail_purge_for(&self, id: Uuid) {
        self.lock().fail_purges.insert(id);
    }

    pub fn len(&self) -> usize {
        self.lock().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches_filter(asset: &MediaAsset, filter: &AssetFilter) -> bool {
    if !filter.include_deleted && asset.is_deleted() {
        return false;
    }
    match &filter.mime_prefix {
        Some(prefix) => asset.mime_type.starts_with(prefix.as_str()),
        None => true,
    }
}

fn page(assets: Vec<MediaAsset>, limit: i64, offset: i64) -> Vec<MediaAsset> {
    assets
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

fn injected_failure(operation: &str) -> AppError {
    AppError::Database(sqlx::Error::Protocol(format!(
        "injected {} failure",
        operation
    )))
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError> {
        let mut state = self.lock();
        if state.fail_inserts {
            return Err(injected_failure("insert"));
        }
        if state.assets.contains_key(&asset.id)
            || state
                .assets
                .values()
                .any(|a| a.storage_key == asset.storage_key)
        {
            return Err(AppError::DuplicateKey(asset.storage_key));
        }
        state.assets.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Option<MediaAsset>, AppError> {
        Ok(self
            .lock()
            .assets
            .get(&id)
            .filter(|a| include_deleted || !a.is_deleted())
            .cloned())
    }

    async fn list(
        &self,
        filter: &AssetFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let mut assets: Vec<MediaAsset> = self
            .lock()
            .assets
            .values()
            .filter(|a| matches_filter(a, filter))
            .cloned()
            .collect();
        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(assets, limit, offset))
    }

    async fn count(&self, filter: &AssetFilter) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .assets
            .values()
            .filter(|a| matches_filter(a, filter))
            .count() as i64)
    }

    async fn list_deleted(&self, limit: i64, offset: i64) -> Result<Vec<MediaAsset>, AppError> {
        let mut assets: Vec<MediaAsset> = self
            .lock()
            .assets
            .values()
            .filter(|a| a.is_deleted())
            .cloned()
            .collect();
        assets.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at).then(b.id.cmp(&a.id)));
        Ok(page(assets, limit, offset))
    }

    async fn count_deleted(&self) -> Result<i64, AppError> {
        Ok(self.lock().assets.values().filter(|a| a.is_deleted()).count() as i64)
    }

    async fn update_alt_text(
        &self,
        id: Uuid,
        alt_text: Option<String>,
    ) -> Result<Option<MediaAsset>, AppError> {
        let mut state = self.lock();
        match state.assets.get_mut(&id) {
            Some(asset) if !asset.is_deleted() => {
                asset.alt_text = alt_text;
                Ok(Some(asset.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_variants(&self, id: Uuid, update: VariantUpdate) -> Result<bool, AppError> {
        let mut state = self.lock();
        if state.fail_variant_updates {
            return Err(injected_failure("variant update"));
        }
        match state.assets.get_mut(&id) {
            Some(asset) => {
                asset.width = Some(update.width);
                asset.height = Some(update.height);
                asset.variants = Some(update.variants);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let mut state = self.lock();
        match state.assets.get_mut(&id) {
            Some(asset) => {
                asset.deleted_at = Some(Utc::now());
                Ok(Some(asset.clone()))
            }
            None => Ok(None),
        }
    }

    async fn restore(&self, id: Uuid) -> Result<RestoreOutcome, AppError> {
        let mut state = self.lock();
        match state.assets.get_mut(&id) {
            Some(asset) if asset.is_deleted() => {
                asset.deleted_at = None;
                Ok(RestoreOutcome::Restored(asset.clone()))
            }
            Some(_) => Ok(RestoreOutcome::NotDeleted),
            None => Ok(RestoreOutcome::NotFound),
        }
    }

    async fn purge(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.lock();
        if state.fail_purges.contains(&id) {
            return Err(injected_failure("purge"));
        }
        Ok(state.assets.remove(&id).is_some())
    }

    async fn purge_if_deleted_before(
        &self,
        id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut state = self.lock();
        if state.fail_purges.contains(&id) {
            return Err(injected_failure("purge"));
        }
        let expired = state
            .assets
            .get(&id)
            .and_then(|a| a.deleted_at)
            .is_some_and(|deleted_at| deleted_at < cutoff);
        if expired {
            state.assets.remove(&id);
        }
        Ok(expired)
    }

    async fn list_soft_deleted_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let mut assets: Vec<MediaAsset> = self
            .lock()
            .assets
            .values()
            .filter(|a| a.deleted_at.is_some_and(|d| d < cutoff))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.deleted_at.cmp(&b.deleted_at));
        Ok(assets)
    }

    async fn count_soft_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .assets
            .values()
            .filter(|a| a.deleted_at.is_some_and(|d| d < cutoff))
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::media::repository::retention_cutoff;
    use chrono::Duration;
    use folio_core::models::{VariantInfo, Variants};
    use folio_core::SupportedMime;

    fn asset(name: &str) -> MediaAsset {
        MediaAsset::new(
            name,
            SupportedMime::Png,
            42,
            format!("2026/10/{}-{}", Uuid::new_v4().simple(), name),
        )
    }

    #[tokio::test]
    async fn test_duplicate_storage_key_rejected() {
        let repo = MemoryAssetRepository::new();
        let first = repo.insert(asset("a.png")).await.unwrap();

        let mut dup = asset("b.png");
        dup.storage_key = first.storage_key.clone();
        let err = repo.insert(dup).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_then_restore_round_trips() {
        let repo = MemoryAssetRepository::new();
        let original = repo.insert(asset("a.png")).await.unwrap();

        let deleted = repo.soft_delete(original.id).await.unwrap().unwrap();
        assert!(deleted.is_deleted());
        assert!(repo.get(original.id, false).await.unwrap().is_none());
        assert!(repo.get(original.id, true).await.unwrap().is_some());

        let restored = match repo.restore(original.id).await.unwrap() {
            RestoreOutcome::Restored(asset) => asset,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(restored, original);
    }

    #[tokio::test]
    async fn test_restore_outcomes() {
        let repo = MemoryAssetRepository::new();
        let active = repo.insert(asset("a.png")).await.unwrap();

        assert_eq!(
            repo.restore(active.id).await.unwrap(),
            RestoreOutcome::NotDeleted
        );
        assert_eq!(
            repo.restore(Uuid::new_v4()).await.unwrap(),
            RestoreOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let repo = MemoryAssetRepository::new();
        let deleted_at = Utc::now() - Duration::days(60);
        let a = repo.insert(asset("a.png")).await.unwrap();
        repo.soft_delete(a.id).await.unwrap();
        repo.set_deleted_at(a.id, Some(deleted_at));

        let at_29_days = retention_cutoff(deleted_at + Duration::days(29), 30);
        assert!(repo
            .list_soft_deleted_before(at_29_days)
            .await
            .unwrap()
            .is_empty());

        let at_31_days = retention_cutoff(deleted_at + Duration::days(31), 30);
        let expired = repo.list_soft_deleted_before(at_31_days).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(repo.count_soft_deleted_before(at_31_days).await.unwrap(), 1);

        assert_eq!(repo.list_expired_soft_deleted(30).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_if_deleted_before_skips_restored() {
        let repo = MemoryAssetRepository::new();
        let a = repo.insert(asset("a.png")).await.unwrap();
        repo.soft_delete(a.id).await.unwrap();
        repo.set_deleted_at(a.id, Some(Utc::now() - Duration::days(40)));
        let cutoff = retention_cutoff(Utc::now(), 30);

        repo.restore(a.id).await.unwrap();
        assert!(!repo.purge_if_deleted_before(a.id, cutoff).await.unwrap());
        assert!(repo.get(a.id, false).await.unwrap().is_some());

        repo.soft_delete(a.id).await.unwrap();
        repo.set_deleted_at(a.id, Some(Utc::now() - Duration::days(40)));
        assert!(repo.purge_if_deleted_before(a.id, cutoff).await.unwrap());
        assert!(repo.get(a.id, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_variants_applies_to_deleted_and_ignores_purged() {
        let repo = MemoryAssetRepository::new();
        let a = repo.insert(asset("a.png")).await.unwrap();
        repo.soft_delete(a.id).await.unwrap();

        let mut variants = Variants::new();
        variants.insert(
            "thumb".to_string(),
            VariantInfo {
                path: "x_thumb.webp".to_string(),
                width: 200,
                height: 100,
            },
        );
        let update = VariantUpdate {
            width: 400,
            height: 200,
            variants,
        };

        assert!(repo.update_variants(a.id, update.clone()).await.unwrap());
        let stored = repo.get(a.id, true).await.unwrap().unwrap();
        assert_eq!(stored.width, Some(400));

        repo.purge(a.id).await.unwrap();
        assert!(!repo.update_variants(a.id, update).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = MemoryAssetRepository::new();
        let mut older = asset("old.png");
        older.created_at = Utc::now() - Duration::hours(1);
        repo.insert(older.clone()).await.unwrap();

        let mut pdf = MediaAsset::new("cv.pdf", SupportedMime::Pdf, 10, "2026/10/x-cv.pdf");
        pdf.created_at = Utc::now();
        repo.insert(pdf.clone()).await.unwrap();

        let all = repo
            .list(&AssetFilter::default(), 20, 0)
            .await
            .unwrap();
        assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), vec![pdf.id, older.id]);

        let images = AssetFilter {
            mime_prefix: Some("image/".to_string()),
            include_deleted: false,
        };
        assert_eq!(repo.count(&images).await.unwrap(), 1);

        repo.soft_delete(older.id).await.unwrap();
        assert_eq!(repo.count(&images).await.unwrap(), 0);
        assert_eq!(repo.count_deleted().await.unwrap(), 1);
        assert_eq!(repo.list(&AssetFilter::default(), 1, 1).await.unwrap().len(), 0);
    }
}
