pub mod health;
pub mod media_delete;
pub mod media_get;
pub mod media_update;
pub mod media_upload;
pub mod responses;
pub mod trash;
