//! Folio Core Library
//!
//! This crate provides the domain model, error types, configuration, and upload
//! validation shared by every Folio component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{AssetConfig, BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use validation::{MediaKind, SizeLimits, SupportedMime, ValidationError, Validator};
