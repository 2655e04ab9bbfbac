//! Folio database layer.
//!
//! Persistence for media assets behind the [`AssetRepository`] trait, with a
//! Postgres implementation and, under the `test-helpers` feature, an
//! in-memory one.

pub mod db;

pub use db::media::{retention_cutoff, AssetRepository, PgAssetRepository};
#[cfg(any(test, feature = "test-helpers"))]
pub use db::media::MemoryAssetRepository;

/// Embedded schema migrations (`migrations/` at the workspace root).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
