//! Upload validation.
//!
//! The set of accepted MIME types is closed: every supported type is a variant
//! of [`SupportedMime`], and each maps to a [`MediaKind`] that decides its size
//! ceiling and whether derived renditions are produced for it. Validation is
//! pure and performs no I/O, so it always runs before anything is written.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_DOCUMENT_SIZE_MB, DEFAULT_MAX_IMAGE_SIZE_MB, MIB};

/// Rejection reasons for a candidate upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Broad category of a supported type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Raster,
    Vector,
    Document,
}

/// Every MIME type the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedMime {
    Jpeg,
    Png,
    Webp,
    Gif,
    Svg,
    Pdf,
}

impl SupportedMime {
    pub const ALL: [SupportedMime; 6] = [
        SupportedMime::Jpeg,
        SupportedMime::Png,
        SupportedMime::Webp,
        SupportedMime::Gif,
        SupportedMime::Svg,
        SupportedMime::Pdf,
    ];

    /// Parse a Content-Type value. Parameters (`; charset=...`) and case are ignored.
    pub fn parse(content_type: &str) -> Option<Self> {
        match normalize_mime_type(content_type).as_str() {
            "image/jpeg" | "image/jpg" => Some(SupportedMime::Jpeg),
            "image/png" => Some(SupportedMime::Png),
            "image/webp" => Some(SupportedMime::Webp),
            "image/gif" => Some(SupportedMime::Gif),
            "image/svg+xml" => Some(SupportedMime::Svg),
            "application/pdf" => Some(SupportedMime::Pdf),
            _ => None,
        }
    }

    /// Canonical MIME string, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedMime::Jpeg => "image/jpeg",
            SupportedMime::Png => "image/png",
            SupportedMime::Webp => "image/webp",
            SupportedMime::Gif => "image/gif",
            SupportedMime::Svg => "image/svg+xml",
            SupportedMime::Pdf => "application/pdf",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            SupportedMime::Jpeg | SupportedMime::Png | SupportedMime::Webp | SupportedMime::Gif => {
                MediaKind::Raster
            }
            SupportedMime::Svg => MediaKind::Vector,
            SupportedMime::Pdf => MediaKind::Document,
        }
    }

    /// Only raster images get variants.
    pub fn is_raster(&self) -> bool {
        self.kind() == MediaKind::Raster
    }
}

impl std::fmt::Display for SupportedMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Size ceilings per media kind, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    pub image_bytes: u64,
    pub document_bytes: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            image_bytes: DEFAULT_MAX_IMAGE_SIZE_MB * MIB,
            document_bytes: DEFAULT_MAX_DOCUMENT_SIZE_MB * MIB,
        }
    }
}

/// Accepts or rejects a candidate upload by MIME type and size.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    limits: SizeLimits,
}

impl Validator {
    pub fn new(limits: SizeLimits) -> Self {
        Self { limits }
    }

    /// Ceiling in bytes for a supported type.
    pub fn max_size(&self, mime: SupportedMime) -> u64 {
        match mime.kind() {
            MediaKind::Raster | MediaKind::Vector => self.limits.image_bytes,
            MediaKind::Document => self.limits.document_bytes,
        }
    }

    /// Largest ceiling across all types; used to size request body limits.
    pub fn largest_ceiling(&self) -> u64 {
        self.limits.image_bytes.max(self.limits.document_bytes)
    }

    /// Validate a candidate upload. Returns the parsed type on success.
    pub fn validate(&self, mime_type: &str, size: u64) -> Result<SupportedMime, ValidationError> {
        let mime = SupportedMime::parse(mime_type).ok_or_else(|| {
            ValidationError::UnsupportedType {
                mime_type: mime_type.to_string(),
            }
        })?;

        let max = self.max_size(mime);
        if size > max {
            return Err(ValidationError::TooLarge { size, max });
        }

        Ok(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ceiling_and_rejects_one_byte_above() {
        let validator = Validator::default();
        for mime in SupportedMime::ALL {
            let max = validator.max_size(mime);
            assert_eq!(validator.validate(mime.as_str(), max), Ok(mime));
            assert_eq!(
                validator.validate(mime.as_str(), max + 1),
                Err(ValidationError::TooLarge { size: max + 1, max })
            );
        }
    }

    #[test]
    fn test_default_ceilings() {
        let validator = Validator::default();
        assert_eq!(validator.max_size(SupportedMime::Jpeg), 10 * MIB);
        assert_eq!(validator.max_size(SupportedMime::Svg), 10 * MIB);
        assert_eq!(validator.max_size(SupportedMime::Pdf), 25 * MIB);
        assert_eq!(validator.largest_ceiling(), 25 * MIB);
    }

    #[test]
    fn test_unsupported_types_always_reject() {
        let validator = Validator::default();
        for mime in ["text/html", "video/mp4", "application/zip", "", "image/bmp"] {
            for size in [0, 1, 10 * MIB, u64::MAX] {
                assert!(matches!(
                    validator.validate(mime, size),
                    Err(ValidationError::UnsupportedType { .. })
                ));
            }
        }
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        assert_eq!(
            SupportedMime::parse("IMAGE/PNG; charset=binary"),
            Some(SupportedMime::Png)
        );
        assert_eq!(SupportedMime::parse("image/jpg"), Some(SupportedMime::Jpeg));
        assert_eq!(SupportedMime::parse(" application/pdf "), Some(SupportedMime::Pdf));
    }

    #[test]
    fn test_only_raster_types_get_variants() {
        let raster: Vec<_> = SupportedMime::ALL
            .iter()
            .filter(|m| m.is_raster())
            .map(|m| m.as_str())
            .collect();
        assert_eq!(raster, vec!["image/jpeg", "image/png", "image/webp", "image/gif"]);
        assert!(!SupportedMime::Svg.is_raster());
        assert!(!SupportedMime::Pdf.is_raster());
    }

    #[test]
    fn test_custom_limits() {
        let validator = Validator::new(SizeLimits {
            image_bytes: 100,
            document_bytes: 200,
        });
        assert!(validator.validate("image/gif", 100).is_ok());
        assert!(validator.validate("image/gif", 101).is_err());
        assert!(validator.validate("application/pdf", 200).is_ok());
    }
}
