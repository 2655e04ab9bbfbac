use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::responses::DeleteResponse;
use crate::state::AppState;

/// Move media to the trash
///
/// Files stay in storage until the media is permanently deleted or the
/// retention period runs out.
#[utoipa::path(
    delete,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media moved to trash", body = DeleteResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.lifecycle.soft_delete(id).await?;

    Ok(Json(DeleteResponse {
        message: "Media moved to trash".to_string(),
        id: asset.id,
        deleted_at: asset.deleted_at,
    }))
}
