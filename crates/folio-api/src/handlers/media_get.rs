use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use folio_core::models::AssetFilter;
use folio_core::AppError;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::{query_rejection, ErrorResponse, HttpAppError};
use crate::handlers::responses::{AssetEnvelope, AssetListResponse, Page};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media found", body = AssetEnvelope),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .repository
        .get(id, false)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    Ok(Json(AssetEnvelope::new(asset, &state.public_base_url)))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMediaQuery {
    /// Page size (default 20, max 100)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
    /// MIME type or prefix, e.g. `image/` or `application/pdf`
    pub mime_type: Option<String>,
    /// Include media in the trash
    pub include_deleted: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/media",
    tag = "media",
    params(ListMediaQuery),
    responses(
        (status = 200, description = "Media page, newest first", body = AssetListResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListMediaQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query.map_err(query_rejection)?;
    let page = Page::from_query(query.limit, query.offset)?;

    let filter = AssetFilter {
        mime_prefix: query
            .mime_type
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty()),
        include_deleted: query.include_deleted.unwrap_or(false),
    };

    let assets = state
        .repository
        .list(&filter, page.limit, page.offset)
        .await?;
    let total = state.repository.count(&filter).await?;

    Ok(Json(AssetListResponse::new(
        assets,
        &state.public_base_url,
        page.pagination(total),
    )))
}
