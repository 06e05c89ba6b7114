//! Custom Axum extractors.

pub mod auth;

pub use auth::{AdminUser, AuthUser, extract_token};
