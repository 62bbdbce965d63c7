//! Merging resolved identifiers back into entries.

use crate::bibtex::{normalize_month, Bibliography};
use crate::error::{BibPmcError, Result};
use crate::models::IdMap;

/// What [`update_entries`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Entries that received a PMCID and PMID
    pub updated: usize,
    /// Month fields rewritten as integers
    pub months_converted: usize,
}

/// Set `pmcid` and `pmid` on every entry whose DOI was resolved, and
/// rewrite `month` fields as integers when `month_int` is set.
///
/// An unrecognized month aborts the update; the caller must not write
/// the bibliography in that case.
pub fn update_entries(
    bibliography: &mut Bibliography,
    ids: &IdMap,
    month_int: bool,
) -> Result<UpdateStats> {
    let mut stats = UpdateStats::default();

    for entry in bibliography.entries_mut() {
        let resolved = entry.doi().and_then(|doi| ids.get(doi)).cloned();
        if let Some(found) = resolved {
            tracing::debug!(
                "{}: pmcid = {}, pmid = {}",
                entry.key,
                found.pmcid,
                found.pmid
            );
            entry.set("pmcid", found.pmcid);
            entry.set("pmid", found.pmid);
            stats.updated += 1;
        }

        if !month_int {
            continue;
        }

        if let Some(month) = entry.month() {
            let number = normalize_month(month).ok_or_else(|| BibPmcError::UnknownMonth {
                key: entry.key.clone(),
                value: month.to_string(),
            })?;
            if number != month {
                entry.set("month", number);
                stats.months_converted += 1;
            }
        }
    }

    tracing::info!("Updated {} entries with PMCID and PMID", stats.updated);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleIds;

    fn ids() -> IdMap {
        let mut map = IdMap::new();
        map.insert("10.1/x", ArticleIds::new("PMC1", "1"));
        map
    }

    #[test]
    fn test_sets_ids_for_resolved_doi() {
        let mut bib = Bibliography::parse("@article{a, doi = {10.1/x}}").unwrap();
        let stats = update_entries(&mut bib, &ids(), true).unwrap();

        let entry = &bib.entries()[0];
        assert_eq!(entry.pmcid(), Some("PMC1"));
        assert_eq!(entry.pmid(), Some("1"));
        assert_eq!(stats.updated, 1);
    }

    #[test]
    fn test_overwrites_existing_ids() {
        let mut bib =
            Bibliography::parse("@article{a, pmid = {9}, doi = {10.1/x}, pmcid = {PMC9}}")
                .unwrap();
        update_entries(&mut bib, &ids(), false).unwrap();

        let entry = &bib.entries()[0];
        assert_eq!(entry.pmid(), Some("1"));
        assert_eq!(entry.pmcid(), Some("PMC1"));
        assert_eq!(entry.fields()[0].name, "pmid");
    }

    #[test]
    fn test_unresolved_entry_keeps_ids() {
        let mut bib =
            Bibliography::parse("@article{a, doi = {10.1/other}, pmcid = {PMC9}, pmid = {9}}")
                .unwrap();
        let stats = update_entries(&mut bib, &ids(), false).unwrap();

        assert_eq!(bib.entries()[0].pmcid(), Some("PMC9"));
        assert_eq!(bib.entries()[0].pmid(), Some("9"));
        assert_eq!(stats.updated, 0);
    }

    #[test]
    fn test_month_conversion() {
        let mut bib = Bibliography::parse(
            "@article{a, month = mar}\n@article{b, month = {December }}\n@article{c, month = 7}",
        )
        .unwrap();
        let stats = update_entries(&mut bib, &IdMap::new(), true).unwrap();

        let months: Vec<_> = bib.entries().iter().map(|e| e.month()).collect();
        assert_eq!(months, vec![Some("3"), Some("12"), Some("7")]);
        assert_eq!(stats.months_converted, 2);
    }

    #[test]
    fn test_month_left_alone_without_month_int() {
        let mut bib = Bibliography::parse("@article{a, month = {Spring}}").unwrap();
        update_entries(&mut bib, &IdMap::new(), false).unwrap();
        assert_eq!(bib.entries()[0].month(), Some("Spring"));
    }

    #[test]
    fn test_unknown_month_is_an_error() {
        let mut bib = Bibliography::parse("@article{a, month = {Spring}}").unwrap();
        let err = update_entries(&mut bib, &IdMap::new(), true).unwrap_err();
        assert!(matches!(
            err,
            BibPmcError::UnknownMonth { ref key, ref value } if key == "a" && value == "Spring"
        ));
    }
}
