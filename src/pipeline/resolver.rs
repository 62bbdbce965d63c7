//! Batched DOI resolution.

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::models::{DoiSet, IdMap};
use crate::pipeline::QueryLog;
use crate::sources::{IdConverter, SourceError};

/// Most DOIs the ID Converter accepts in one request
pub const BATCH_SIZE: usize = 128;

/// Counters for one resolution run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Requests sent
    pub batches: usize,
    /// Requests answered with a non-200 status
    pub failed_batches: usize,
    /// DOIs that received a PMCID and PMID
    pub resolved: usize,
}

/// Look up every DOI in `dois`, one batch at a time.
///
/// A batch answered with a non-200 status is logged and skipped. Any other
/// failure ends the run. Successful responses are appended to `query_log`
/// before their records are merged.
pub async fn resolve_ids(
    converter: &dyn IdConverter,
    dois: &DoiSet,
    mut query_log: Option<&mut QueryLog>,
    show_progress: bool,
) -> Result<(IdMap, ResolveStats)> {
    let total = dois.len().div_ceil(BATCH_SIZE);
    let progress = progress_bar(total, show_progress);
    let mut ids = IdMap::new();
    let mut stats = ResolveStats::default();

    tracing::info!(
        "Querying {} for {} DOIs in {} batches",
        converter.name(),
        dois.len(),
        total
    );

    for (index, batch) in dois.batches(BATCH_SIZE).enumerate() {
        stats.batches += 1;
        progress.set_message(format!("batch {}/{}", index + 1, total));

        let response = match converter.convert(batch).await {
            Ok(response) => response,
            Err(SourceError::Status(code)) => {
                stats.failed_batches += 1;
                tracing::error!(
                    "Error - {} returned status code {} for batch {}/{}",
                    converter.name(),
                    code,
                    index + 1,
                    total
                );
                progress.inc(1);
                continue;
            }
            Err(e) => {
                progress.abandon();
                return Err(e.into());
            }
        };

        if let Some(log) = query_log.as_deref_mut() {
            log.append(&response.body)?;
        }

        // Service records may spell a DOI with different case
        let mut requested: HashMap<String, Vec<&str>> = HashMap::new();
        for doi in batch {
            requested.entry(doi.to_lowercase()).or_default().push(doi);
        }

        for record in response.records {
            match requested.get(&record.doi.to_lowercase()) {
                Some(matches) => {
                    for doi in matches {
                        ids.insert(*doi, record.ids.clone());
                    }
                }
                None => tracing::debug!("ignoring record for unrequested DOI {}", record.doi),
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    stats.resolved = ids.len();
    if ids.is_empty() {
        tracing::warn!("Warning - no DOI resolved to both a PMCID and a PMID");
    }

    tracing::info!(
        "Resolved {} of {} DOIs ({} of {} batches failed)",
        stats.resolved,
        dois.len(),
        stats.failed_batches,
        stats.batches
    );
    Ok((ids, stats))
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {wide_bar:.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉ "),
    );
    pb
}
