//! Folio API Library
//!
//! HTTP handlers, router and application setup for the media service.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
mod middleware;
pub mod setup;
pub mod state;
mod telemetry;
mod utils;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::{setup_routes, RouterSettings};
pub use state::AppState;
