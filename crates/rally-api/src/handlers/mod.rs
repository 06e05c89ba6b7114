//! Route handlers organized by domain.

pub mod alerts;
pub mod auth;
pub mod health;
pub mod session;
pub mod ws;
