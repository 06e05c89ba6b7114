//! Convenience result type alias for Rally.

use crate::error::AppError;

/// A specialized `Result` type for Rally operations.
pub type AppResult<T> = Result<T, AppError>;
