//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use folio_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        version = "0.1.0",
        description = "Media assets for a portfolio site: upload, browse, trash and restore images, SVGs and PDFs. Raster images get thumb, medium and large WebP renditions in the background."
    ),
    paths(
        handlers::media_upload::upload_media,
        handlers::media_get::get_media,
        handlers::media_get::list_media,
        handlers::media_update::update_media,
        handlers::media_delete::delete_media,
        handlers::trash::list_trash,
        handlers::trash::restore_media,
        handlers::trash::purge_media,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::AssetResponse,
            models::VariantResponse,
            models::Pagination,
            handlers::responses::AssetEnvelope,
            handlers::responses::AssetListResponse,
            handlers::responses::DeleteResponse,
            handlers::responses::PurgeResponse,
            handlers::media_update::UpdateMediaRequest,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "media", description = "Upload, read, edit and trash media"),
        (name = "trash", description = "Restore or permanently delete trashed media"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/media",
            "/media/{id}",
            "/media/trash",
            "/media/trash/{id}/restore",
            "/media/trash/{id}",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
