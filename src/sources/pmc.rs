//! NCBI PMC ID Converter implementation.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::StatusCode;
use url::Url;

use crate::models::{ArticleIds, IdRecord};
use crate::sources::{ConverterResponse, IdConverter, SourceError};
use crate::utils::HttpClient;

pub const PMC_IDCONV_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/";

/// Value of the `tool` query parameter NCBI asks every client to send
pub const DEFAULT_TOOL: &str = "BibPMC";

/// PMC ID Converter client
///
/// Sends `ids`, `tool` and `email` as query parameters, one GET per batch.
#[derive(Debug, Clone)]
pub struct PmcIdConverter {
    client: HttpClient,
    base_url: Url,
    tool: String,
    email: String,
}

impl PmcIdConverter {
    pub fn new(email: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: Url::parse(PMC_IDCONV_URL)?,
            tool: DEFAULT_TOOL.to_string(),
            email: email.into(),
        })
    }

    /// Point at a different service endpoint (a mirror or a test server)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, SourceError> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, dois: &[String]) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("ids", &dois.join(","))
            .append_pair("tool", &self.tool)
            .append_pair("email", &self.email);
        url
    }
}

#[async_trait]
impl IdConverter for PmcIdConverter {
    fn name(&self) -> &str {
        "PMC ID Converter"
    }

    async fn convert(&self, dois: &[String]) -> Result<ConverterResponse, SourceError> {
        if dois.is_empty() {
            return Err(SourceError::InvalidRequest("empty batch".to_string()));
        }

        let url = self.build_url(dois);
        tracing::debug!("PMC ID Converter request for {} DOIs: {}", dois.len(), url);

        let response = self.client.client().get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let records = parse_idconv_response(&body)?;
        tracing::debug!("PMC ID Converter returned {} complete records", records.len());

        Ok(ConverterResponse { body, records })
    }
}

/// Extract complete records from an ID Converter XML response.
///
/// Every `record` element at any depth that carries non-empty `doi`, `pmcid`
/// and `pmid` attributes yields one [`IdRecord`]. Error records and records
/// for articles outside PMC lack some of these and are skipped.
pub fn parse_idconv_response(xml: &str) -> Result<Vec<IdRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut elements = 0usize;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                elements += 1;
                depth += 1;
                collect_record(&e, &mut records);
            }
            Event::Empty(e) => {
                elements += 1;
                collect_record(&e, &mut records);
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof if depth > 0 => {
                return Err(SourceError::Parse(format!(
                    "response ends with {} unclosed element(s)",
                    depth
                )));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if elements == 0 {
        return Err(SourceError::Parse(
            "response contains no XML elements".to_string(),
        ));
    }

    Ok(records)
}

fn collect_record(e: &BytesStart<'_>, records: &mut Vec<IdRecord>) {
    if e.local_name().as_ref() != b"record" {
        return;
    }
    match record_from(e) {
        Some(record) => records.push(record),
        None => tracing::trace!(
            "skipping incomplete record for {:?}",
            get_attr(e, b"requested-id")
        ),
    }
}

fn record_from(e: &BytesStart<'_>) -> Option<IdRecord> {
    let doi = get_attr(e, b"doi")?;
    let pmcid = get_attr(e, b"pmcid")?;
    let pmid = get_attr(e, b"pmid")?;
    Some(IdRecord {
        doi,
        ids: ArticleIds { pmcid, pmid },
    })
}

/// Get a trimmed, non-empty attribute value
fn get_attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
