//! Route configuration and setup

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use folio_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::constants::{MULTIPART_OVERHEAD_BYTES, UPLOADS_ROUTE};
use crate::handlers;
use crate::middleware::payload_too_large_json;
use crate::state::AppState;

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Router-level settings derived from `Config`.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub cors_origins: Vec<String>,
    /// Directory served under `/uploads`.
    pub storage_path: PathBuf,
    pub max_body_bytes: usize,
    pub concurrency_limit: usize,
}

impl RouterSettings {
    pub fn from_config(config: &Config) -> Self {
        let largest = usize::try_from(config.validator().largest_ceiling()).unwrap_or(usize::MAX);

        // Server-level concurrency limit to protect against resource exhaustion under extreme load
        let concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
            .max(1);

        Self {
            cors_origins: config.cors_origins().to_vec(),
            storage_path: config.storage_path().to_path_buf(),
            max_body_bytes: largest.saturating_add(MULTIPART_OVERHEAD_BYTES),
            concurrency_limit,
        }
    }
}

/// Setup all application routes
pub fn setup_routes(settings: &RouterSettings, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&settings.cors_origins)?;

    tracing::info!(
        max_body_bytes = settings.max_body_bytes,
        http_concurrency_limit = settings.concurrency_limit,
        storage_path = %settings.storage_path.display(),
        "Routes configured"
    );

    let app = media_routes()
        .route("/health", get(handlers::health::health_check))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&settings.storage_path))
        .merge(
            utoipa_rapidoc::RapiDoc::with_openapi("/api/openapi.json", ApiDoc::openapi())
                .path("/docs"),
        )
        // Multipart reads are bounded by RequestBodyLimitLayer instead
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(axum::middleware::from_fn(payload_too_large_json))
        .layer(ConcurrencyLimitLayer::new(settings.concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/media",
            post(handlers::media_upload::upload_media).get(handlers::media_get::list_media),
        )
        .route("/media/trash", get(handlers::trash::list_trash))
        .route(
            "/media/trash/{id}/restore",
            post(handlers::trash::restore_media),
        )
        .route("/media/trash/{id}", delete(handlers::trash::purge_media))
        .route(
            "/media/{id}",
            get(handlers::media_get::get_media)
                .put(handlers::media_update::update_media)
                .delete(handlers::media_delete::delete_media),
        )
}

/// Setup CORS configuration
fn setup_cors(origins: &[String]) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        assert!(setup_cors(&["*".to_string()]).is_ok());
        assert!(setup_cors(&["https://example.com".to_string()]).is_ok());
        assert!(setup_cors(&["bad\norigin".to_string()]).is_err());
    }
}
