//! HTTP-layer constants.

/// Room for multipart boundaries and headers on top of the largest file ceiling.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub const MAX_ALT_TEXT_LENGTH: usize = 1000;

/// Mount point of the stored files; `PUBLIC_BASE_URL` defaults to this path.
pub const UPLOADS_ROUTE: &str = "/uploads";
