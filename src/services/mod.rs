pub mod auth_service;
pub mod blob_store;
pub mod discovery_service;
pub mod image_service;
pub mod user_service;
