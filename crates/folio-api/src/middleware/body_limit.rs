use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use folio_core::AppError;

use crate::error::HttpAppError;

/// Render body-limit rejections in the ErrorResponse format.
///
/// `RequestBodyLimitLayer` answers a declared `Content-Length` over the limit
/// with a plain-text 413 before any handler runs. JSON 413s from handlers
/// pass through untouched.
pub async fn payload_too_large_json(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json(&response) {
        return response;
    }

    HttpAppError(AppError::PayloadTooLarge(
        "Request body exceeds the upload limit".to_string(),
    ))
    .into_response()
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use serde_json::Value;

    fn app() -> Router {
        Router::new()
            .route(
                "/plain",
                get(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded") }),
            )
            .route(
                "/json",
                get(|| async {
                    HttpAppError(AppError::PayloadTooLarge("File is 11 bytes".to_string()))
                }),
            )
            .route("/ok", get(|| async { "fine" }))
            .layer(axum::middleware::from_fn(payload_too_large_json))
    }

    #[tokio::test]
    async fn test_plain_413_becomes_error_response() {
        let server = TestServer::new(app()).unwrap();

        let response = server.get("/plain").await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let body = response.json::<Value>();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(body["error"], "Request body exceeds the upload limit");
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let server = TestServer::new(app()).unwrap();

        let response = server.get("/json").await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.json::<Value>()["error"], "File is 11 bytes");

        let response = server.get("/ok").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "fine");
    }
}
