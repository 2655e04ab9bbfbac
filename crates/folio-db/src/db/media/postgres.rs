use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::models::{AssetFilter, MediaAsset, RestoreOutcome, VariantUpdate, Variants};
use folio_core::AppError;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use super::repository::AssetRepository;

const COLUMNS: &str = "id, filename, mime_type, size, storage_key, alt_text, width, height, \
                       variants, created_at, deleted_at";

/// Row shape of `media_assets`.
#[derive(Debug, FromRow)]
struct MediaAssetRow {
    id: Uuid,
    filename: String,
    mime_type: String,
    size: i64,
    storage_key: String,
    alt_text: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    variants: Option<sqlx::types::JsonValue>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl MediaAssetRow {
    fn into_asset(self) -> MediaAsset {
        let variants = self.variants.and_then(|value| {
            match serde_json::from_value::<Variants>(value) {
                Ok(v) if !v.is_empty() => Some(v),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(media_id = %self.id, error = %e, "Ignoring malformed variants column");
                    None
                }
            }
        });

        MediaAsset {
            id: self.id,
            filename: self.filename,
            mime_type: self.mime_type,
            size: self.size,
            storage_key: self.storage_key,
            alt_text: self.alt_text,
            width: self.width,
            height: self.height,
            variants,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// Escape LIKE metacharacters so a prefix filter matches literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_insert_error(err: sqlx::Error, asset: &MediaAsset) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::DuplicateKey(asset.storage_key.clone());
        }
    }
    AppError::from(err)
}

/// Postgres-backed asset repository.
#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    #[tracing::instrument(skip(self, asset), fields(db.table = "media_assets", db.operation = "insert", db.record_id = %asset.id))]
    async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError> {
        let variants = asset
            .variants
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row: MediaAssetRow = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "INSERT INTO media_assets ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        ))
        .bind(asset.id)
        .bind(&asset.filename)
        .bind(&asset.mime_type)
        .bind(asset.size)
        .bind(&asset.storage_key)
        .bind(&asset.alt_text)
        .bind(asset.width)
        .bind(asset.height)
        .bind(variants)
        .bind(asset.created_at)
        .bind(asset.deleted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &asset))?;

        Ok(row.into_asset())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Option<MediaAsset>, AppError> {
        let row: Option<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "SELECT {COLUMNS} FROM media_assets WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        ))
        .bind(id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaAssetRow::into_asset))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    async fn list(
        &self,
        filter: &AssetFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let rows: Vec<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "SELECT {COLUMNS} FROM media_assets \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::TEXT IS NULL OR mime_type LIKE $2 || '%' ESCAPE '\\') \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.include_deleted)
        .bind(filter.mime_prefix.as_deref().map(escape_like))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaAssetRow::into_asset).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "count"))]
    async fn count(&self, filter: &AssetFilter) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM media_assets \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::TEXT IS NULL OR mime_type LIKE $2 || '%' ESCAPE '\\')",
        )
        .bind(filter.include_deleted)
        .bind(filter.mime_prefix.as_deref().map(escape_like))
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    async fn list_deleted(&self, limit: i64, offset: i64) -> Result<Vec<MediaAsset>, AppError> {
        let rows: Vec<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "SELECT {COLUMNS} FROM media_assets WHERE deleted_at IS NOT NULL \
             ORDER BY deleted_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaAssetRow::into_asset).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "count"))]
    async fn count_deleted(&self) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM media_assets WHERE deleted_at IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    #[tracing::instrument(skip(self, alt_text), fields(db.table = "media_assets", db.operation = "update", db.record_id = %id))]
    async fn update_alt_text(
        &self,
        id: Uuid,
        alt_text: Option<String>,
    ) -> Result<Option<MediaAsset>, AppError> {
        let row: Option<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "UPDATE media_assets SET alt_text = $2 \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(alt_text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaAssetRow::into_asset))
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "media_assets", db.operation = "update", db.record_id = %id))]
    async fn update_variants(&self, id: Uuid, update: VariantUpdate) -> Result<bool, AppError> {
        let variants = serde_json::to_value(&update.variants)?;

        let result = sqlx::query(
            "UPDATE media_assets SET width = $2, height = $3, variants = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(update.width)
        .bind(update.height)
        .bind(variants)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "soft_delete", db.record_id = %id))]
    async fn soft_delete(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let row: Option<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "UPDATE media_assets SET deleted_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaAssetRow::into_asset))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "restore", db.record_id = %id))]
    async fn restore(&self, id: Uuid) -> Result<RestoreOutcome, AppError> {
        let row: Option<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "UPDATE media_assets SET deleted_at = NULL \
             WHERE id = $1 AND deleted_at IS NOT NULL RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(RestoreOutcome::Restored(row.into_asset()));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM media_assets WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(if exists {
            RestoreOutcome::NotDeleted
        } else {
            RestoreOutcome::NotFound
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete", db.record_id = %id))]
    async fn purge(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete", db.record_id = %id))]
    async fn purge_if_deleted_before(
        &self,
        id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM media_assets \
             WHERE id = $1 AND deleted_at IS NOT NULL AND deleted_at < $2",
        )
        .bind(id)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    async fn list_soft_deleted_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let rows: Vec<MediaAssetRow> = sqlx::query_as::<Postgres, MediaAssetRow>(&format!(
            "SELECT {COLUMNS} FROM media_assets \
             WHERE deleted_at IS NOT NULL AND deleted_at < $1 \
             ORDER BY deleted_at ASC"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaAssetRow::into_asset).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "count"))]
    async fn count_soft_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM media_assets WHERE deleted_at IS NOT NULL AND deleted_at < $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("image/"), "image/");
        assert_eq!(escape_like("%"), "\\%");
        assert_eq!(escape_like("image/_"), "image/\\_");
        assert_eq!(escape_like("a\\b%"), "a\\\\b\\%");
    }
}
