//! # BibPMC
//!
//! Adds PubMed Central (PMCID) and PubMed (PMID) identifiers to BibTeX files
//! by looking up each entry's DOI with the NCBI PMC ID Converter service.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`bibtex`]: BibTeX reading, field access and writing
//! - [`models`]: DOI sets and identifier maps passed between stages
//! - [`sources`]: The ID converter trait and its NCBI implementation
//! - [`pipeline`]: Extraction, batch resolution, entry updates and the end-to-end run
//! - [`utils`]: HTTP client and input validation
//! - [`config`]: Configuration management
//! - [`logging`]: Console and file log setup

pub mod bibtex;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use bibtex::{Bibliography, Entry};
pub use error::BibPmcError;
pub use models::{ArticleIds, DoiSet, IdMap};
pub use sources::{IdConverter, PmcIdConverter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
