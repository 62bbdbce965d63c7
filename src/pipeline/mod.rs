//! The end-to-end run: validate, read, extract, resolve, update, write.
//!
//! Each stage is also exported on its own.
//!
//! ```rust,no_run
//! use bibpmc::pipeline::{run, RunOptions};
//! use bibpmc::PmcIdConverter;
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = RunOptions::new("me@example.com", PathBuf::from("refs.bib"));
//! let converter = PmcIdConverter::new(options.email.clone())?;
//! let summary = run(&options, &converter).await?;
//! println!("{} entries updated", summary.updated);
//! # Ok(())
//! # }
//! ```

mod extract;
mod query_log;
mod resolver;
mod update;

use std::path::{Path, PathBuf};

use chrono::Local;

pub use extract::extract_dois;
pub use query_log::{QueryLog, QueryLogError};
pub use resolver::{resolve_ids, ResolveStats, BATCH_SIZE};
pub use update::{update_entries, UpdateStats};

use crate::bibtex::Bibliography;
use crate::error::Result;
use crate::sources::IdConverter;
use crate::utils::{validate_email, validate_input_file};

/// Suffix that replaces the input extension in the default output name
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_BibPMC.bib";

/// Everything one run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Contact address sent to NCBI
    pub email: String,
    pub in_bib: PathBuf,
    pub out_bib: PathBuf,
    /// Look up DOIs of entries that already have both identifiers
    pub include_existing: bool,
    /// Rewrite month fields as integers
    pub month_int: bool,
    /// Write raw responses to `pmc_query_<timestamp>.xml` next to the output
    pub query_log: bool,
    pub show_progress: bool,
}

impl RunOptions {
    /// Defaults: output next to the input, month conversion and query log on
    pub fn new(email: impl Into<String>, in_bib: PathBuf) -> Self {
        let out_bib = default_out_bib(&in_bib, DEFAULT_OUTPUT_SUFFIX);
        Self {
            email: email.into(),
            in_bib,
            out_bib,
            include_existing: false,
            month_int: true,
            query_log: true,
            show_progress: false,
        }
    }

    /// Directory that receives the query log: the output's parent, or the
    /// current directory when the output path has none
    pub fn output_dir(&self) -> &Path {
        match self.out_bib.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// `refs.bib` → `refs_BibPMC.bib`
pub fn default_out_bib(in_bib: &Path, suffix: &str) -> PathBuf {
    let stem = in_bib
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    in_bib.with_file_name(format!("{}{}", stem, suffix))
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub entries: usize,
    pub dois: usize,
    pub resolve: ResolveStats,
    pub updated: usize,
    pub out_bib: PathBuf,
    pub query_log: Option<PathBuf>,
}

/// Run the whole pipeline against `converter`.
///
/// Nothing is written if any stage fails, except query log batches that
/// completed before the failure.
pub async fn run(options: &RunOptions, converter: &dyn IdConverter) -> Result<RunSummary> {
    validate_input_file(&options.in_bib)?;
    validate_email(&options.email)?;

    let mut bibliography = Bibliography::read(&options.in_bib)?;
    if bibliography.is_empty() {
        tracing::warn!("Warning - {} contains no entries", options.in_bib.display());
    }
    let dois = extract_dois(&bibliography, options.include_existing)?;

    let mut query_log = if options.query_log {
        Some(QueryLog::open(options.output_dir(), Local::now())?)
    } else {
        None
    };

    let (ids, resolve) = resolve_ids(
        converter,
        &dois,
        query_log.as_mut(),
        options.show_progress,
    )
    .await?;

    let stats = update_entries(&mut bibliography, &ids, options.month_int)?;
    bibliography.write(&options.out_bib)?;

    let query_log = query_log
        .map(|log| log.path().to_path_buf())
        .filter(|path| path.exists());

    Ok(RunSummary {
        entries: bibliography.len(),
        dois: dois.len(),
        resolve,
        updated: stats.updated,
        out_bib: options.out_bib.clone(),
        query_log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BibPmcError;
    use crate::sources::MockConverter;
    use crate::utils::ValidationError;

    #[test]
    fn test_default_out_bib() {
        assert_eq!(
            default_out_bib(Path::new("refs.bib"), DEFAULT_OUTPUT_SUFFIX),
            PathBuf::from("refs_BibPMC.bib")
        );
        assert_eq!(
            default_out_bib(Path::new("/data/papers.v2.bib"), DEFAULT_OUTPUT_SUFFIX),
            PathBuf::from("/data/papers.v2_BibPMC.bib")
        );
        assert_eq!(
            default_out_bib(Path::new("library"), "_out.bib"),
            PathBuf::from("library_out.bib")
        );
    }

    #[test]
    fn test_output_dir() {
        let options = RunOptions::new("me@example.com", PathBuf::from("refs.bib"));
        assert_eq!(options.output_dir(), Path::new("."));

        let options = RunOptions::new("me@example.com", PathBuf::from("/tmp/x/refs.bib"));
        assert_eq!(options.output_dir(), Path::new("/tmp/x"));
    }

    #[tokio::test]
    async fn test_run_updates_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let in_bib = dir.path().join("refs.bib");
        std::fs::write(
            &in_bib,
            "@article{a, doi = {10.1/x}, month = {March}}\n@book{b, title = {No DOI}}\n",
        )
        .unwrap();

        let converter = MockConverter::new().with_ids("10.1/x", "PMC1", "1");
        let options = RunOptions::new("me@example.com", in_bib);
        let summary = run(&options, &converter).await.unwrap();

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.out_bib, dir.path().join("refs_BibPMC.bib"));
        assert!(summary.query_log.as_deref().is_some_and(Path::exists));

        let written = Bibliography::read(&summary.out_bib).unwrap();
        let entry = written.get("a").unwrap();
        assert_eq!(entry.pmcid(), Some("PMC1"));
        assert_eq!(entry.pmid(), Some("1"));
        assert_eq!(entry.month(), Some("3"));
    }

    #[tokio::test]
    async fn test_run_validates_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let converter = MockConverter::new();

        let missing = RunOptions::new("not-an-email", dir.path().join("missing.bib"));
        assert!(matches!(
            run(&missing, &converter).await,
            Err(BibPmcError::Validation(ValidationError::MissingInputFile(_)))
        ));

        let in_bib = dir.path().join("refs.bib");
        std::fs::write(&in_bib, "@article{a, doi = {10.1/x}}").unwrap();
        let bad_email = RunOptions::new("not-an-email", in_bib);
        assert!(matches!(
            run(&bad_email, &converter).await,
            Err(BibPmcError::Validation(ValidationError::InvalidEmail(_)))
        ));
        assert!(converter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_month_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let in_bib = dir.path().join("refs.bib");
        std::fs::write(&in_bib, "@article{a, doi = {10.1/x}, month = {Spring}}").unwrap();

        let mut options = RunOptions::new("me@example.com", in_bib);
        options.query_log = false;
        let err = run(&options, &MockConverter::new()).await.unwrap_err();

        assert!(matches!(err, BibPmcError::UnknownMonth { .. }));
        assert!(!options.out_bib.exists());
    }
}
