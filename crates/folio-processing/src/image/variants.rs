//! Variant processor: fixed-width WebP renditions of raster originals.

use bytes::Bytes;
use folio_core::models::{VariantInfo, VariantUpdate, Variants};
use folio_core::SupportedMime;
use folio_storage::{variant_key, Storage, StorageError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

const WEBP_CONTENT_TYPE: &str = "image/webp";

/// A named rendition and its target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: &'static str,
    pub width: u32,
}

pub const DEFAULT_VARIANTS: [VariantSpec; 3] = [
    VariantSpec {
        name: "thumb",
        width: 200,
    },
    VariantSpec {
        name: "medium",
        width: 800,
    },
    VariantSpec {
        name: "large",
        width: 1600,
    },
];

/// Failures while building renditions. Never surfaced past the processor.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to read original: {0}")]
    Read(#[source] StorageError),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode rendition {name}: {message}")]
    Encode { name: &'static str, message: String },

    #[error("Failed to write rendition {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Processing task failed: {0}")]
    Task(String),
}

/// One encoded rendition ready to be written.
struct EncodedVariant {
    name: &'static str,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Output of the CPU-bound stage.
struct Encoded {
    width: u32,
    height: u32,
    variants: Vec<EncodedVariant>,
}

/// Target size for a rendition: never wider than the source, aspect ratio kept.
pub fn target_dimensions(src_width: u32, src_height: u32, target_width: u32) -> (u32, u32) {
    let width = target_width.min(src_width).max(1);
    let height = ((src_height as f64) * (width as f64) / (src_width.max(1) as f64)).round() as u32;
    (width, height.max(1))
}

fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::Decode(e.to_string()))?;
    reader
        .decode()
        .map_err(|e| ProcessingError::Decode(e.to_string()))
}

fn encode_all(data: &[u8], specs: &[VariantSpec]) -> Result<Encoded, ProcessingError> {
    let img = decode(data)?;
    let (src_width, src_height) = img.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(ProcessingError::Decode("image has zero dimensions".to_string()));
    }

    let mut variants = Vec::with_capacity(specs.len());
    for spec in specs {
        let (width, height) = target_dimensions(src_width, src_height, spec.width);
        let resized = if width == src_width && height == src_height {
            img.clone()
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        // The WebP encoder only accepts 8-bit RGB(A).
        let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
        let mut buffer = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
            .map_err(|e| ProcessingError::Encode {
                name: spec.name,
                message: e.to_string(),
            })?;

        variants.push(EncodedVariant {
            name: spec.name,
            width,
            height,
            data: buffer,
        });
    }

    Ok(Encoded {
        width: src_width,
        height: src_height,
        variants,
    })
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Builds the rendition set for an uploaded raster image.
#[derive(Clone)]
pub struct VariantProcessor {
    storage: Arc<dyn Storage>,
    specs: Vec<VariantSpec>,
}

impl VariantProcessor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_specs(storage, DEFAULT_VARIANTS.to_vec())
    }

    pub fn with_specs(storage: Arc<dyn Storage>, specs: Vec<VariantSpec>) -> Self {
        Self { storage, specs }
    }

    pub fn specs(&self) -> &[VariantSpec] {
        &self.specs
    }

    /// Build, encode and store every rendition of `storage_key`.
    ///
    /// Returns `None` for non-raster types and on any failure; in the latter
    /// case renditions already written in this run are removed.
    #[tracing::instrument(skip(self))]
    pub async fn process(&self, storage_key: &str, mime: SupportedMime) -> Option<VariantUpdate> {
        if !mime.is_raster() || self.specs.is_empty() {
            return None;
        }

        let start = Instant::now();
        let mut written = Vec::new();

        match self.try_process(storage_key, &mut written).await {
            Ok(update) => {
                tracing::info!(
                    storage_key = %storage_key,
                    variant_count = update.variants.len(),
                    width = update.width,
                    height = update.height,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Variants generated"
                );
                Some(update)
            }
            Err(e) => {
                tracing::warn!(
                    storage_key = %storage_key,
                    error = %e,
                    written = written.len(),
                    "Variant generation failed"
                );
                for key in written {
                    if let Err(remove_err) = self.storage.remove(&key).await {
                        tracing::error!(
                            storage_key = %key,
                            error = %remove_err,
                            "Failed to remove partial variant"
                        );
                    }
                }
                None
            }
        }
    }

    async fn try_process(
        &self,
        storage_key: &str,
        written: &mut Vec<String>,
    ) -> Result<VariantUpdate, ProcessingError> {
        let data = self
            .storage
            .read(storage_key)
            .await
            .map_err(ProcessingError::Read)?;

        let specs = self.specs.clone();
        // Decode/resize/encode is CPU-bound; keep it off the async workers.
        let encoded = tokio::task::spawn_blocking(move || encode_all(&data, &specs))
            .await
            .map_err(|e| ProcessingError::Task(e.to_string()))??;

        let mut variants = Variants::new();
        for variant in encoded.variants {
            let key = variant_key(storage_key, variant.name);
            self.storage
                .write(&key, Bytes::from(variant.data), WEBP_CONTENT_TYPE)
                .await
                .map_err(|source| ProcessingError::Write {
                    key: key.clone(),
                    source,
                })?;
            written.push(key.clone());

            variants.insert(
                variant.name.to_string(),
                VariantInfo {
                    path: key,
                    width: to_i32(variant.width),
                    height: to_i32(variant.height),
                },
            );
        }

        Ok(VariantUpdate {
            width: to_i32(encoded.width),
            height: to_i32(encoded.height),
            variants,
        })
    }
}
