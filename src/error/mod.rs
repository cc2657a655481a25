//! Error Handling Module
//!
//! - Core error type (`LlmError`) and its coarse `ErrorCategory`
//! - Conversions from transport, parsing and IO errors
//!
//! # Example
//!
//! ```rust
//! use sql_analyst::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Provider);
//! assert_eq!(error.http_status(), 500);
//! ```

mod conversions;
pub mod types;

pub use types::*;
