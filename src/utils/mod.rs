//! Utility modules supporting the pipeline.
//!
//! - [`HttpClient`]: Shared reqwest client carrying the crate's user agent
//! - [`validate_email`]: Check the contact address sent to NCBI
//! - [`validate_input_file`]: Check that the BibTeX input exists
//!
//! # Validation
//!
//! ```rust
//! use bibpmc::utils::{validate_email, ValidationError};
//!
//! assert!(validate_email("someone@example.com").is_ok());
//! assert!(matches!(
//!     validate_email("not-an-email"),
//!     Err(ValidationError::InvalidEmail(_))
//! ));
//! ```

mod http;
mod validate;

pub use http::{HttpClient, USER_AGENT};
pub use validate::{validate_email, validate_input_file, ValidationError};
