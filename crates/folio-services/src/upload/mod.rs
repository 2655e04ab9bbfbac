pub mod service;

pub use service::{IncomingFile, MediaUploadService, UploadedAsset};
