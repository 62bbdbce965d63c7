//! Crate-level error type.

use crate::bibtex::BibtexError;
use crate::pipeline::QueryLogError;
use crate::sources::SourceError;
use crate::utils::ValidationError;

/// Any failure that ends a run.
///
/// Recoverable conditions (a batch answered with a non-200 status) never
/// surface here; the resolver logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum BibPmcError {
    /// Bad email address or missing input file
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The BibTeX input could not be read or the output could not be written
    #[error(transparent)]
    Bibtex(#[from] BibtexError),

    /// Transport failure or malformed response from the ID converter
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The cumulative query log could not be loaded or written
    #[error(transparent)]
    QueryLog(#[from] QueryLogError),

    /// No entry carried a DOI eligible for lookup
    #[error("No DOIs found in BibTeX file")]
    EmptyDoiSet,

    /// A month field that is neither a month name nor a number from 1 to 12
    #[error("unrecognized month value '{value}' in entry '{key}'")]
    UnknownMonth { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, BibPmcError>;
