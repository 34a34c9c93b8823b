//! Utilities - common helpers and re-exported error types
//!
//! - [`AppError`] / [`AppResult`] / [`ApiResponse`] (from `shared::error`)
//! - [`logger`] - tracing setup
//! - [`time`] - business date helpers

pub mod logger;
pub mod time;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
