use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_core::Validator;
use folio_db::MemoryAssetRepository;
use folio_processing::VariantProcessor;
use folio_storage::{LocalStorage, Storage};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use crate::cleanup::CleanupService;
use crate::lifecycle::LifecycleService;
use crate::upload::MediaUploadService;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// Memory repository plus local storage rooted in a temp dir.
pub struct TestContext {
    dir: TempDir,
    pub repo: MemoryAssetRepository,
    pub storage: Arc<dyn Storage>,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost/uploads".to_string())
            .await
            .unwrap();
        Self {
            dir,
            repo: MemoryAssetRepository::new(),
            storage: Arc::new(storage),
        }
    }

    pub fn upload_service(&self, validator: Validator) -> MediaUploadService {
        MediaUploadService::new(
            Arc::new(self.repo.clone()),
            self.storage.clone(),
            VariantProcessor::new(self.storage.clone()),
            validator,
        )
    }

    pub fn lifecycle_service(&self) -> LifecycleService {
        LifecycleService::new(Arc::new(self.repo.clone()), self.storage.clone())
    }

    pub fn cleanup_service(&self) -> CleanupService {
        CleanupService::new(Arc::new(self.repo.clone()), self.storage.clone())
    }

    /// Storage keys of every file on disk, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path: PathBuf = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    let rel = path.strip_prefix(root).unwrap();
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        let mut files = Vec::new();
        walk(self.dir.path(), self.dir.path(), &mut files);
        files.sort();
        files
    }
}
