#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod postgres;
pub mod repository;

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryAssetRepository;
pub use postgres::PgAssetRepository;
pub use repository::{retention_cutoff, AssetRepository};
