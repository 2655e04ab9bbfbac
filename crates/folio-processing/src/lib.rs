//! Folio media processing.
//!
//! Derived renditions for raster uploads. Processing is best-effort: callers
//! receive `None` rather than an error when a rendition set cannot be built.

pub mod image;

pub use crate::image::{ProcessingError, VariantProcessor, VariantSpec, DEFAULT_VARIANTS};
