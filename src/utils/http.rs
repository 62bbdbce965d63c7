//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;

/// User agent sent with every request: `bibpmc/<version>`
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client
///
/// No request timeout is set unless one is asked for; the ID converter can
/// take a while to answer large batches.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(None)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, SourceError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| SourceError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            timeout,
        })
    }

    /// Request timeout, `None` when requests wait indefinitely
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
