//! BibTeX reading and writing.
//!
//! A [`Bibliography`] is read once from the input file, mutated field by
//! field, and written back out. Entries are never added or removed.
//!
//! ```rust
//! use bibpmc::Bibliography;
//!
//! let mut bib = Bibliography::parse("@article{key, doi = {10.1/x}}").unwrap();
//! bib.entries_mut()[0].set("pmid", "1");
//! assert!(bib.to_bibtex_string().contains("pmid = 1,"));
//! ```

mod entry;
mod formatter;
mod month;
mod parser;

use std::path::{Path, PathBuf};

pub use entry::{Entry, Field};
pub use formatter::format_entry;
pub use month::normalize_month;

/// Errors raised while reading or writing BibTeX files
#[derive(Debug, thiserror::Error)]
pub enum BibtexError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("BibTeX syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("repeated citation key '{key}' on line {line}")]
    DuplicateKey { key: String, line: usize },
}

/// An ordered collection of BibTeX entries plus the file's preambles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography {
    preambles: Vec<String>,
    entries: Vec<Entry>,
}

impl Bibliography {
    /// Parse BibTeX source text
    pub fn parse(source: &str) -> Result<Self, BibtexError> {
        parser::parse_bibliography(source)
    }

    /// Read and parse a BibTeX file
    pub fn read(path: &Path) -> Result<Self, BibtexError> {
        tracing::info!("reading BibTeX file: {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| BibtexError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let bibliography = Self::parse(&source)?;
        tracing::debug!(entries = bibliography.len(), "parsed BibTeX file");
        Ok(bibliography)
    }

    /// Serialize and write to `path`, replacing any existing file
    pub fn write(&self, path: &Path) -> Result<(), BibtexError> {
        tracing::info!("writing updated BibTeX entries to {}", path.display());
        std::fs::write(path, self.to_bibtex_string()).map_err(|source| BibtexError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize to BibTeX text
    pub fn to_bibtex_string(&self) -> String {
        formatter::format_bibliography(self)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn preambles(&self) -> &[String] {
        &self.preambles
    }

    /// Look up an entry by citation key, ignoring ASCII case as BibTeX does
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key.eq_ignore_ascii_case(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
