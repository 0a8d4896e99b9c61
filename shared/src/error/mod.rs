//! Unified error system for the floor engine
//!
//! - [`ErrorCode`]: Standardized error codes shared with the backend
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Response envelope returned by the backend
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 7xxx: Table errors (including merge and link groups)
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, ErrorCode};
//!
//! let response: ApiResponse<()> =
//!     serde_json::from_str(r#"{"code":7005,"message":"Table 2 is already linked"}"#).unwrap();
//!
//! let err = response.to_error().unwrap();
//! assert_eq!(err.code, ErrorCode::TableAlreadyLinked);
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError};
