//! Response envelopes and paging.

use folio_core::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use folio_core::models::{AssetResponse, MediaAsset, Pagination};
use chrono::{DateTime, Utc};
use folio_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetEnvelope {
    pub data: AssetResponse,
}

impl AssetEnvelope {
    pub fn new(asset: MediaAsset, base_url: &str) -> Self {
        Self {
            data: AssetResponse::from_asset(asset, base_url),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetListResponse {
    pub data: Vec<AssetResponse>,
    pub pagination: Pagination,
}

impl AssetListResponse {
    pub fn new(assets: Vec<MediaAsset>, base_url: &str, pagination: Pagination) -> Self {
        Self {
            data: assets
                .into_iter()
                .map(|asset| AssetResponse::from_asset(asset, base_url))
                .collect(),
            pagination,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResponse {
    pub message: String,
    pub id: Uuid,
}

/// Effective paging window. Missing values take defaults; `limit` is
/// clamped to 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Result<Self, AppError> {
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::InvalidInput(
                "offset must be zero or greater".to_string(),
            ));
        }

        let limit = limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);

        Ok(Self { limit, offset })
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination {
            total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
