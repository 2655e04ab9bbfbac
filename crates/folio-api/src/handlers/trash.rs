//! Trash: list, restore and permanently delete soft-deleted media.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::{query_rejection, ErrorResponse, HttpAppError};
use crate::handlers::responses::{AssetEnvelope, AssetListResponse, Page, PurgeResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrashQuery {
    /// Page size (default 20, max 100)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/media/trash",
    tag = "trash",
    params(TrashQuery),
    responses(
        (status = 200, description = "Trashed media, most recently deleted first", body = AssetListResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_trash(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrashQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query.map_err(query_rejection)?;
    let page = Page::from_query(query.limit, query.offset)?;

    let assets = state.repository.list_deleted(page.limit, page.offset).await?;
    let total = state.repository.count_deleted().await?;

    Ok(Json(AssetListResponse::new(
        assets,
        &state.public_base_url,
        page.pagination(total),
    )))
}

#[utoipa::path(
    post,
    path = "/media/trash/{id}/restore",
    tag = "trash",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media restored", body = AssetEnvelope),
        (status = 404, description = "Media not found or not in the trash", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn restore_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.lifecycle.restore(id).await?;
    Ok(Json(AssetEnvelope::new(asset, &state.public_base_url)))
}

/// Permanently delete trashed media and its files
#[utoipa::path(
    delete,
    path = "/media/trash/{id}",
    tag = "trash",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media permanently deleted", body = PurgeResponse),
        (status = 404, description = "Media not found or not in the trash", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn purge_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.lifecycle.purge(id).await?;

    Ok(Json(PurgeResponse {
        message: "Media permanently deleted".to_string(),
        id: asset.id,
    }))
}
