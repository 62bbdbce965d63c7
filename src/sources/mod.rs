//! Identifier conversion services.
//!
//! This module defines the [`IdConverter`] trait that turns a batch of DOIs
//! into PubMed identifiers. [`PmcIdConverter`] talks to the NCBI PMC ID
//! Converter; [`MockConverter`] answers from a fixed table for tests.
//!
//! # Implementing a converter
//!
//! ```rust
//! use async_trait::async_trait;
//! use bibpmc::sources::{ConverterResponse, IdConverter, SourceError};
//!
//! #[derive(Debug)]
//! struct Offline;
//!
//! #[async_trait]
//! impl IdConverter for Offline {
//!     fn name(&self) -> &str {
//!         "Offline"
//!     }
//!
//!     async fn convert(&self, _dois: &[String]) -> Result<ConverterResponse, SourceError> {
//!         Err(SourceError::Status(503))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::models::IdRecord;

pub mod mock;
mod pmc;

pub use mock::MockConverter;
pub use pmc::{parse_idconv_response, PmcIdConverter, DEFAULT_TOOL, PMC_IDCONV_URL};

/// A successful answer to one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterResponse {
    /// Raw XML body as returned by the service, kept for the query log
    pub body: String,
    /// Records that carry a DOI, a PMCID and a PMID
    pub records: Vec<IdRecord>,
}

/// Converts batches of DOIs to PubMed identifiers
///
/// Callers send at most one batch at a time and never retry. A
/// [`SourceError::Status`] means the service rejected this batch only; every
/// other error means the service cannot be used.
#[async_trait]
pub trait IdConverter: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this service
    fn name(&self) -> &str;

    /// Look up one batch of DOIs
    async fn convert(&self, dois: &[String]) -> Result<ConverterResponse, SourceError>;
}

/// Errors that can occur when talking to a converter
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure: DNS, connection, TLS, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a status other than 200
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body was not usable XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::InvalidRequest(format!("URL: {}", err))
    }
}
