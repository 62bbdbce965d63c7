//! Ordered set of distinct DOIs.

use std::collections::HashSet;

/// Distinct DOIs in first-seen order
///
/// Order matters: batches are cut from this sequence, so the same input
/// always produces the same requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoiSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl DoiSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a DOI; returns `false` if it was already present
    pub fn insert(&mut self, doi: impl Into<String>) -> bool {
        let doi = doi.into();
        if self.seen.contains(&doi) {
            return false;
        }
        self.seen.insert(doi.clone());
        self.order.push(doi);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Consecutive batches of at most `size` DOIs
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, String> {
        self.order.chunks(size)
    }
}

impl<S: Into<String>> FromIterator<S> for DoiSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = DoiSet::new();
        for doi in iter {
            set.insert(doi);
        }
        set
    }
}
