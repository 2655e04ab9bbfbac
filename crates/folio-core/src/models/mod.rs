//! Domain models.

pub mod asset;

pub use asset::{
    public_url, AssetFilter, AssetResponse, MediaAsset, Pagination, RestoreOutcome, VariantInfo,
    VariantResponse, VariantUpdate, Variants,
};
