//! PubMed identifiers and the DOI-keyed map that collects them.

use std::collections::HashMap;

/// PubMed Central and PubMed identifiers for one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleIds {
    /// PubMed Central ID, e.g. `PMC3531190`
    pub pmcid: String,
    /// PubMed ID, e.g. `23193287`
    pub pmid: String,
}

impl ArticleIds {
    pub fn new(pmcid: impl Into<String>, pmid: impl Into<String>) -> Self {
        Self {
            pmcid: pmcid.into(),
            pmid: pmid.into(),
        }
    }
}

/// One complete record returned by the ID converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRecord {
    /// DOI as spelled by the service
    pub doi: String,
    pub ids: ArticleIds,
}

/// DOI → identifiers, keyed by the DOI exactly as it was requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    inner: HashMap<String, ArticleIds>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the identifiers for `doi`
    pub fn insert(&mut self, doi: impl Into<String>, ids: ArticleIds) -> Option<ArticleIds> {
        self.inner.insert(doi.into(), ids)
    }

    pub fn get(&self, doi: &str) -> Option<&ArticleIds> {
        self.inner.get(doi)
    }

    pub fn contains(&self, doi: &str) -> bool {
        self.inner.contains_key(doi)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
