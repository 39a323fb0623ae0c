//! # nbgrader-core
//!
//! Core crate for nbgrader hub access control. Contains configuration
//! schemas, typed student/course identifiers, the course membership
//! result type, and the unified error system.
//!
//! This crate has **no** internal dependencies on other nbgrader crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
