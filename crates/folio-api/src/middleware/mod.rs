pub mod body_limit;

pub use body_limit::payload_too_large_json;
