use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use folio_core::AppError;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::MAX_ALT_TEXT_LENGTH;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::responses::AssetEnvelope;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMediaRequest {
    /// New alt text; `null` or blank clears it
    pub alt_text: Option<String>,
}

fn normalize_alt_text(alt_text: Option<String>) -> Result<Option<String>, AppError> {
    let Some(text) = alt_text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_ALT_TEXT_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "altText must be at most {} characters",
            MAX_ALT_TEXT_LENGTH
        )));
    }

    Ok(Some(text))
}

#[utoipa::path(
    put,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = UpdateMediaRequest,
    responses(
        (status = 200, description = "Media updated", body = AssetEnvelope),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMediaRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let alt_text = normalize_alt_text(request.alt_text)?;

    let asset = state
        .repository
        .update_alt_text(id, alt_text)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    tracing::info!(media_id = %id, "Media alt text updated");

    Ok(Json(AssetEnvelope::new(asset, &state.public_base_url)))
}
