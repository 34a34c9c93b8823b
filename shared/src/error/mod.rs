//! Unified error system
//!
//! - [`ErrorCode`]: standardized numeric codes
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: error with code, message and details
//! - [`ApiResponse`]: response envelope for errors
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Approval workflow errors
//! - 4xxx: Finance errors
//! - 5xxx: Project errors
//! - 6xxx: Upload errors
//! - 8xxx: User and HR errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::ClientNotFound);
//! let err = AppError::validation("Missing required field").with_detail("field", "email");
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.error.as_deref(), Some("BAD_REQUEST"));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
