//! Validation of command-line inputs.
//!
//! Both checks run before anything touches the network.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("BibTeX file not found: {}", .0.display())]
    MissingInputFile(PathBuf),
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$")
        .unwrap_or_else(|e| panic!("email pattern does not compile: {e}"))
});

/// Check an email address for the NCBI `email` parameter
///
/// Accepts a local part of word, dot, plus and hyphen characters and a
/// domain with at least one dot.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Check that the input file exists
pub fn validate_input_file(path: &Path) -> Result<(), ValidationError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ValidationError::MissingInputFile(path.to_path_buf()))
    }
}
