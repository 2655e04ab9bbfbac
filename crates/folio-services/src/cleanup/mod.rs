pub mod service;

pub use service::{CleanupItemError, CleanupReport, CleanupService};
