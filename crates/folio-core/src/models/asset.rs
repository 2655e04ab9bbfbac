use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::SupportedMime;

/// One derived rendition of a raster original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VariantInfo {
    /// Storage key of the rendition
    pub path: String,
    pub width: i32,
    pub height: i32,
}

/// Variant name -> rendition. Ordered so serialized output is stable.
pub type Variants = BTreeMap<String, VariantInfo>;

/// One uploaded file and its metadata.
///
/// `width`/`height` are both `None` or both positive. `variants` is only ever
/// set for raster types and is never an empty map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub alt_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub variants: Option<Variants>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MediaAsset {
    /// A freshly uploaded asset: no dimensions, no variants, not deleted.
    pub fn new(
        filename: impl Into<String>,
        mime: SupportedMime,
        size: i64,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            mime_type: mime.as_str().to_string(),
            size,
            storage_key: storage_key.into(),
            alt_text: None,
            width: None,
            height: None,
            variants: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn supported_mime(&self) -> Option<SupportedMime> {
        SupportedMime::parse(&self.mime_type)
    }

    /// Every storage key owned by this asset: the original followed by its renditions.
    pub fn storage_keys(&self) -> Vec<String> {
        let mut keys = vec![self.storage_key.clone()];
        if let Some(variants) = &self.variants {
            keys.extend(variants.values().map(|v| v.path.clone()));
        }
        keys
    }
}

/// Result of post-upload processing, written back in a single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantUpdate {
    pub width: i32,
    pub height: i32,
    pub variants: Variants,
}

/// Filters for listing assets.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Matches the start of the MIME type, e.g. `image/` or `application/pdf`
    pub mime_prefix: Option<String>,
    pub include_deleted: bool,
}

/// Outcome of a restore request.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored(MediaAsset),
    /// The asset exists but is not soft-deleted.
    NotDeleted,
    NotFound,
}

/// Join a public base URL and a storage key.
pub fn public_url(base_url: &str, storage_key: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        storage_key.trim_start_matches('/')
    )
}

/// API representation of a rendition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariantResponse {
    pub path: String,
    pub width: i32,
    pub height: i32,
    pub url: String,
}

/// API representation of an asset. URLs are derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub variants: Option<BTreeMap<String, VariantResponse>>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AssetResponse {
    pub fn from_asset(asset: MediaAsset, base_url: &str) -> Self {
        let variants = asset.variants.map(|variants| {
            variants
                .into_iter()
                .map(|(name, v)| {
                    let url = public_url(base_url, &v.path);
                    (
                        name,
                        VariantResponse {
                            path: v.path,
                            width: v.width,
                            height: v.height,
                            url,
                        },
                    )
                })
                .collect()
        });

        Self {
            url: public_url(base_url, &asset.storage_key),
            id: asset.id,
            filename: asset.filename,
            mime_type: asset.mime_type,
            size: asset.size,
            storage_key: asset.storage_key,
            alt_text: asset.alt_text,
            width: asset.width,
            height: asset.height,
            variants,
            created_at: asset.created_at,
            deleted_at: asset.deleted_at,
        }
    }
}

/// Pagination block returned with list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
