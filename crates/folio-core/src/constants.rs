//! Shared constants.

/// One mebibyte, used for size ceilings.
pub const MIB: u64 = 1024 * 1024;

/// Default ceiling for raster and vector images.
pub const DEFAULT_MAX_IMAGE_SIZE_MB: u64 = 10;

/// Default ceiling for documents (PDF).
pub const DEFAULT_MAX_DOCUMENT_SIZE_MB: u64 = 25;

/// Default retention for soft-deleted assets before the cleanup job purges them.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Default and maximum page sizes for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;
