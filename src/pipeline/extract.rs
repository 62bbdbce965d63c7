//! DOI extraction.

use std::collections::HashSet;

use crate::bibtex::Bibliography;
use crate::error::{BibPmcError, Result};
use crate::models::DoiSet;

/// Collect the DOIs to look up, in entry order.
///
/// Entries that already carry a PMCID or a PMID are skipped unless
/// `include_existing` is set. A DOI seen twice is looked up once and
/// warned about even when the later entry is skipped.
pub fn extract_dois(bibliography: &Bibliography, include_existing: bool) -> Result<DoiSet> {
    let mut dois = DoiSet::new();
    let mut seen = HashSet::new();

    for entry in bibliography.entries() {
        let Some(doi) = entry.doi() else {
            continue;
        };

        if !seen.insert(doi) {
            tracing::warn!("Warning - duplicate DOI {} found in entry {}", doi, entry.key);
        }

        let has_any = entry.pmcid().is_some() || entry.pmid().is_some();
        if has_any && !include_existing {
            tracing::debug!("{} already has a PMCID or PMID, skipping", entry.key);
            continue;
        }

        dois.insert(doi);
    }

    if dois.is_empty() {
        return Err(BibPmcError::EmptyDoiSet);
    }

    tracing::info!("Found {} unique DOIs to look up", dois.len());
    Ok(dois)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
@article{complete, doi = {10.1/a}, pmcid = {PMC1}, pmid = {1}}
@article{partial, doi = {10.1/b}, pmid = {2}}
@article{pmc_only, doi = {10.1/d}, pmcid = {PMC4}}
@article{bare, doi = {10.1/c}}
@article{again, doi = { 10.1/c }}
@book{nodoi, title = {No DOI}}
@misc{blank, doi = {}}
"#;

    #[test]
    fn test_skips_entries_with_any_id() {
        let bib = Bibliography::parse(SOURCE).unwrap();
        let dois = extract_dois(&bib, false).unwrap();
        assert_eq!(dois.iter().collect::<Vec<_>>(), vec!["10.1/c"]);
    }

    #[test]
    fn test_include_existing() {
        let bib = Bibliography::parse(SOURCE).unwrap();
        let dois = extract_dois(&bib, true).unwrap();
        assert_eq!(
            dois.iter().collect::<Vec<_>>(),
            vec!["10.1/a", "10.1/b", "10.1/d", "10.1/c"]
        );
    }

    #[test]
    fn test_empty_set_is_an_error() {
        let bib = Bibliography::parse(
            "@article{x, doi = {10.1/a}, pmcid = {PMC1}, pmid = {1}}\n@book{y, title = {T}}",
        )
        .unwrap();
        assert!(matches!(
            extract_dois(&bib, false),
            Err(BibPmcError::EmptyDoiSet)
        ));
        assert_eq!(extract_dois(&bib, true).unwrap().len(), 1);
    }

    #[test]
    fn test_single_id_entries_are_skipped() {
        let bib = Bibliography::parse(
            "@article{p, doi = {10.1/p}, pmid = {5}}
             @article{q, doi = {10.1/q}, pmcid = {PMC6}}
             @article{r, doi = {10.1/r}}",
        )
        .unwrap();
        let dois = extract_dois(&bib, false).unwrap();
        assert_eq!(dois.iter().collect::<Vec<_>>(), vec!["10.1/r"]);
    }

    #[test]
    fn test_duplicate_of_skipped_entry_is_still_looked_up() {
        let bib = Bibliography::parse(
            "@article{first, doi = {10.1/z}, pmid = {9}}
@article{second, doi = {10.1/z}}",
        )
        .unwrap();
        let dois = extract_dois(&bib, false).unwrap();
        assert_eq!(dois.iter().collect::<Vec<_>>(), vec!["10.1/z"]);
    }
}
