//! Transport for collector requests
//!
//! The reporter hands a fully built [`ReportRequest`] to a [`Transport`] and
//! only ever looks at the returned status. [`HttpTransport`] is the
//! production implementation on top of reqwest; tests substitute their own.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::Endpoint;
use crate::error::{Result, StellateError};

/// An outbound POST to the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Which endpoint this request targets
    pub endpoint: Endpoint,

    /// Absolute URL
    pub url: String,

    /// Header name/value pairs, in send order
    pub headers: Vec<(&'static str, String)>,

    /// JSON body
    pub body: String,
}

impl ReportRequest {
    /// Look up a header value by (case-insensitive) name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Delivers report requests and returns the collector's status
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// POST the request; the response body is never read
    async fn post(&self, request: ReportRequest) -> Result<StatusCode>;
}

/// reqwest-backed transport using the client's default timeouts
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a default client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stellate-instrumentation/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StellateError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (shared pools, custom TLS)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: ReportRequest) -> Result<StatusCode> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.body(request.body).send().await?;

        Ok(response.status())
    }
}
