//! Result alias shared by every nbgrader crate.

use crate::error::AppError;

/// `Result` specialized to [`AppError`] for application-boundary code.
pub type AppResult<T> = Result<T, AppError>;
