//! Cumulative XML log of raw ID Converter responses.
//!
//! The first successful batch provides the root element; every later batch
//! contributes the children of its own root. The whole document is rewritten
//! after each batch through a temporary file in the same directory, so the
//! log on disk is always a complete XML document.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tempfile::NamedTempFile;

/// Errors raised while loading or writing the query log
#[derive(Debug, thiserror::Error)]
pub enum QueryLogError {
    #[error("failed to read query log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write query log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid XML in query log: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to serialize query log: {0}")]
    Serialize(String),

    #[error("XML document has no root element")]
    MissingRoot,

    #[error("XML document ends before its root element is closed")]
    Truncated,
}

/// Root element plus its children, held as owned events
#[derive(Debug, Clone)]
struct XmlDocument {
    root: BytesStart<'static>,
    children: Vec<Event<'static>>,
}

impl XmlDocument {
    fn parse(xml: &str) -> Result<Self, QueryLogError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        // Prolog: declaration, comments, doctype
        let root = loop {
            match reader.read_event()? {
                Event::Start(e) => break e.into_owned(),
                Event::Empty(e) => {
                    return Ok(Self {
                        root: e.into_owned(),
                        children: Vec::new(),
                    })
                }
                Event::Eof => return Err(QueryLogError::MissingRoot),
                _ => {}
            }
        };

        let mut children = Vec::new();
        let mut depth = 0usize;
        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => break,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(QueryLogError::Truncated),
                _ => {}
            }
            children.push(event.into_owned());
        }

        Ok(Self { root, children })
    }

    fn to_bytes(&self) -> Result<Vec<u8>, QueryLogError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(serialize)?;
        writer
            .write_event(Event::Start(self.root.borrow()))
            .map_err(serialize)?;
        for child in &self.children {
            writer.write_event(child.borrow()).map_err(serialize)?;
        }
        writer
            .write_event(Event::End(self.root.to_end()))
            .map_err(serialize)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn serialize<E: std::fmt::Display>(err: E) -> QueryLogError {
    QueryLogError::Serialize(err.to_string())
}

/// Query log bound to one file for the duration of a run
#[derive(Debug)]
pub struct QueryLog {
    path: PathBuf,
    document: Option<XmlDocument>,
}

impl QueryLog {
    /// `pmc_query_<YYYYMMDD_HHMM>.xml` for a run started at `started`
    pub fn file_name(started: DateTime<Local>) -> String {
        started.format("pmc_query_%Y%m%d_%H%M.xml").to_string()
    }

    /// Bind the log for a run started at `started` inside `dir`.
    ///
    /// A log left by an earlier run in the same minute is loaded and extended.
    pub fn open(dir: &Path, started: DateTime<Local>) -> Result<Self, QueryLogError> {
        let path = dir.join(Self::file_name(started));

        let document = if path.exists() {
            tracing::debug!("extending existing query log {}", path.display());
            let text = std::fs::read_to_string(&path).map_err(|source| QueryLogError::Read {
                path: path.clone(),
                source,
            })?;
            Some(XmlDocument::parse(&text)?)
        } else {
            None
        };

        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge one raw response into the log and rewrite the file
    pub fn append(&mut self, response_xml: &str) -> Result<(), QueryLogError> {
        let incoming = XmlDocument::parse(response_xml)?;

        match self.document.as_mut() {
            Some(document) => document.children.extend(incoming.children),
            None => self.document = Some(incoming),
        }

        self.persist()
    }

    fn persist(&self) -> Result<(), QueryLogError> {
        let Some(document) = &self.document else {
            return Ok(());
        };
        let bytes = document.to_bytes()?;

        let write_error = |source: std::io::Error| QueryLogError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
        temp.write_all(&bytes).map_err(write_error)?;
        temp.persist(&self.path).map_err(|e| write_error(e.error))?;

        tracing::debug!("query log written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::parse_idconv_response;
    use chrono::TimeZone;

    fn response(doi: &str, pmcid: &str, pmid: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<pmcids status="ok">
<request idtype="doi"><echo>ids={doi}</echo></request>
<record requested-id="{doi}" pmcid="{pmcid}" pmid="{pmid}" doi="{doi}"/>
</pmcids>"#
        )
    }

    fn started() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 59).single().unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(QueryLog::file_name(started()), "pmc_query_20240305_1407.xml");
    }

    #[test]
    fn test_nothing_written_without_batches() {
        let dir = tempfile::tempdir().unwrap();
        let log = QueryLog::open(dir.path(), started()).unwrap();
        assert!(!log.path().exists());
    }

    #[test]
    fn test_two_batches_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = QueryLog::open(dir.path(), started()).unwrap();

        log.append(&response("10.1/a", "PMC1", "1")).unwrap();
        log.append(&response("10.1/b", "PMC2", "2")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert_eq!(text.matches("<pmcids").count(), 1);
        assert_eq!(text.matches("<request").count(), 2);

        let records = parse_idconv_response(&text).unwrap();
        let dois: Vec<&str> = records.iter().map(|r| r.doi.as_str()).collect();
        assert_eq!(dois, vec!["10.1/a", "10.1/b"]);
    }

    #[test]
    fn test_existing_log_is_extended() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = QueryLog::open(dir.path(), started()).unwrap();
        first.append(&response("10.1/a", "PMC1", "1")).unwrap();

        let mut second = QueryLog::open(dir.path(), started()).unwrap();
        second.append(&response("10.1/b", "PMC2", "2")).unwrap();

        let text = std::fs::read_to_string(second.path()).unwrap();
        assert_eq!(parse_idconv_response(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(QueryLog::file_name(started()));
        std::fs::write(&path, "<pmcids><record doi=\"10.1/a\"/>").unwrap();

        let err = QueryLog::open(dir.path(), started()).unwrap_err();
        assert!(matches!(
            err,
            QueryLogError::Truncated | QueryLogError::Xml(_)
        ));
    }

    #[test]
    fn test_escaped_text_survives() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = QueryLog::open(dir.path(), started()).unwrap();
        log.append(r#"<pmcids><record doi="10.1/a&amp;b" pmcid="PMC1" pmid="1"/></pmcids>"#)
            .unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("10.1/a&amp;b"));
        assert_eq!(parse_idconv_response(&text).unwrap()[0].doi, "10.1/a&b");
    }
}
