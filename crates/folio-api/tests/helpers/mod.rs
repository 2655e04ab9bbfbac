//! Test helpers: build the router over an in-memory repository and a
//! temp-dir store. No database or Docker needed.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use folio_api::{setup_routes, AppState, RouterSettings};
use folio_core::{SizeLimits, Validator};
use folio_db::MemoryAssetRepository;
use folio_storage::{LocalStorage, Storage};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tempfile::TempDir;

pub const PUBLIC_BASE_URL: &str = "http://localhost:4000/uploads";

pub struct TestApp {
    pub server: TestServer,
    pub repo: MemoryAssetRepository,
    pub storage: Arc<dyn Storage>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limits(SizeLimits::default()).await
}

pub async fn setup_test_app_with_limits(limits: SizeLimits) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(temp_dir.path(), PUBLIC_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage"),
    );
    let repo = MemoryAssetRepository::new();
    let validator = Validator::new(limits);

    let state = Arc::new(AppState::new(
        Arc::new(repo.clone()),
        storage.clone(),
        validator,
        PUBLIC_BASE_URL,
    ));
    let settings = RouterSettings {
        cors_origins: vec!["*".to_string()],
        storage_path: temp_dir.path().to_path_buf(),
        max_body_bytes: validator.largest_ceiling() as usize + 1024 * 1024,
        concurrency_limit: 64,
    };
    let router = setup_routes(&settings, state).expect("Failed to build router");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        repo,
        storage,
        _temp_dir: temp_dir,
    }
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 80, 40]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    buffer
}

pub fn file_form(filename: &str, mime_type: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(filename.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part("file", part)
}

pub async fn upload(client: &TestServer, filename: &str, mime_type: &str, data: Vec<u8>) -> TestResponse {
    client
        .post("/media")
        .multipart(file_form(filename, mime_type, data))
        .await
}

/// Upload and return the `data` object of the 201 response.
pub async fn upload_ok(client: &TestServer, filename: &str, mime_type: &str, data: Vec<u8>) -> Value {
    let response = upload(client, filename, mime_type, data).await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json::<Value>()["data"].clone()
}

/// Poll `GET /media/{id}` until variants are recorded.
pub async fn wait_for_variants(client: &TestServer, id: &str) -> Value {
    for _ in 0..100 {
        let response = client.get(&format!("/media/{}", id)).await;
        let body = response.json::<Value>();
        if !body["data"]["variants"].is_null() {
            return body["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("variants were never recorded for {}", id);
}
