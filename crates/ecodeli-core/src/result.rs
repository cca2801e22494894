//! Convenience result type alias for EcoDeli.

use crate::error::AppError;

/// A specialized `Result` type for EcoDeli operations.
pub type AppResult<T> = Result<T, AppError>;
