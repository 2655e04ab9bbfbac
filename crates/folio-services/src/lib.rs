//! Folio Services Layer
//!
//! Orchestration over the repository, file store and variant processor:
//! uploads, the soft-delete lifecycle and the expiry cleanup job. HTTP handling
//! stays in folio-api; these services are shared with the CLI.

pub mod cleanup;
pub mod files;
pub mod lifecycle;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use cleanup::{CleanupItemError, CleanupReport, CleanupService};
pub use lifecycle::LifecycleService;
pub use upload::{IncomingFile, MediaUploadService, UploadedAsset};
