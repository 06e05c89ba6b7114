//! # rally-core
//!
//! Core crate for Rally. Contains the unified error system, configuration
//! schemas, typed identifiers, and the mail collaborator trait.
//!
//! This crate has **no** internal dependencies on other Rally crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, reason};
pub use result::AppResult;
