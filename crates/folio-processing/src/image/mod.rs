//! Image processing.

pub mod variants;

pub use variants::{ProcessingError, VariantProcessor, VariantSpec, DEFAULT_VARIANTS};
