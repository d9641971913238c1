pub mod auth;
pub mod discovery;
pub mod images;
pub mod user;
