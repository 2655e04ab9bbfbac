use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::responses::AssetEnvelope;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Upload a media file
///
/// Responds as soon as the original is stored. Renditions of raster images
/// are generated in the background and show up on later reads.
#[utoipa::path(
    post,
    path = "/media",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form with a single `file` field"),
    responses(
        (status = 201, description = "Media stored", body = AssetEnvelope),
        (status = 400, description = "Missing, empty or duplicate file field", body = ErrorResponse),
        (status = 413, description = "File exceeds the size limit for its type", body = ErrorResponse),
        (status = 415, description = "Unsupported media type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;
    let uploaded = state.upload.upload(file).await?;

    Ok((
        StatusCode::CREATED,
        Json(AssetEnvelope::new(uploaded.asset, &state.public_base_url)),
    ))
}
