//! Folio Storage Library
//!
//! Storage abstraction and the local filesystem backend.
//!
//! # Storage key format
//!
//! Originals are stored under `{yyyy}/{mm}/{token}-{sanitized-name}`; renditions
//! sit beside them as `{stem}_{variant}.webp`. Keys must not contain `..` or a
//! leading `/`. Key generation lives in the `keys` module so callers never
//! build keys by hand.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{new_key, sanitize_filename, variant_key};
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
