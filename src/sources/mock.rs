//! Mock converter for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use quick_xml::escape::escape;

use crate::models::{ArticleIds, IdRecord};
use crate::sources::{parse_idconv_response, ConverterResponse, IdConverter, SourceError};

/// A converter that answers from a fixed DOI table.
///
/// Responses are rendered in the same XML shape the NCBI service uses, so
/// they go through the real response parser and can be written to a query
/// log. Unknown DOIs get an error record. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockConverter {
    ids: HashMap<String, ArticleIds>,
    unrequested: Vec<IdRecord>,
    failing_batches: HashSet<usize>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockConverter {
    /// Create a mock that knows no DOIs
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `doi` with the given identifiers
    pub fn with_ids(mut self, doi: &str, pmcid: &str, pmid: &str) -> Self {
        self.ids.insert(doi.to_string(), ArticleIds::new(pmcid, pmid));
        self
    }

    /// Add a record for `doi` to every response, whether requested or not
    pub fn with_unrequested(mut self, doi: &str, pmcid: &str, pmid: &str) -> Self {
        self.unrequested.push(IdRecord {
            doi: doi.to_string(),
            ids: ArticleIds::new(pmcid, pmid),
        });
        self
    }

    /// Answer the `index`-th call (zero-based) with HTTP 500
    pub fn fail_batch(mut self, index: usize) -> Self {
        self.failing_batches.insert(index);
        self
    }

    /// Batches received so far, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Render the XML body the service would send for `dois`
    pub fn render(&self, dois: &[String]) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<pmcids status=\"ok\">\n");
        xml.push_str(&format!(
            "<request idtype=\"doi\"><echo>ids={}</echo></request>\n",
            escape(dois.join(",").as_str())
        ));

        for doi in dois {
            let requested = escape(doi.as_str());
            match self.lookup(doi) {
                Some((known, ids)) => xml.push_str(&format!(
                    "<record requested-id=\"{}\" pmcid=\"{}\" pmid=\"{}\" doi=\"{}\"/>\n",
                    requested,
                    escape(ids.pmcid.as_str()),
                    escape(ids.pmid.as_str()),
                    escape(known)
                )),
                None => xml.push_str(&format!(
                    "<record requested-id=\"{}\" status=\"error\" errmsg=\"invalid article id\"/>\n",
                    requested
                )),
            }
        }

        for record in &self.unrequested {
            xml.push_str(&format!(
                "<record pmcid=\"{}\" pmid=\"{}\" doi=\"{}\"/>\n",
                escape(record.ids.pmcid.as_str()),
                escape(record.ids.pmid.as_str()),
                escape(record.doi.as_str())
            ));
        }

        xml.push_str("</pmcids>\n");
        xml
    }

    fn lookup(&self, doi: &str) -> Option<(&str, &ArticleIds)> {
        self.ids
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(doi))
            .map(|(known, ids)| (known.as_str(), ids))
    }
}

#[async_trait]
impl IdConverter for MockConverter {
    fn name(&self) -> &str {
        "Mock Converter"
    }

    async fn convert(&self, dois: &[String]) -> Result<ConverterResponse, SourceError> {
        let index = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(dois.to_vec());
            calls.len() - 1
        };

        if self.failing_batches.contains(&index) {
            return Err(SourceError::Status(500));
        }

        let body = self.render(dois);
        let records = parse_idconv_response(&body)?;
        Ok(ConverterResponse { body, records })
    }
}
