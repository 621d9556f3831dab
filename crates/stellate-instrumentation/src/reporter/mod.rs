//! Fire-and-forget reporting to the Stellate collector
//!
//! Every [`Reporter::send`] builds one POST request and spawns one detached
//! task to deliver it. The caller gets control back as soon as the task is
//! spawned. Delivery failures (transport errors, status >= 300) are logged
//! once at `WARN` inside the task and never propagate anywhere else. There is
//! no retry, batching or queueing.
//!
//! # Example
//!
//! ```rust,no_run
//! use stellate_instrumentation::{Endpoint, Reporter, StellateConfig};
//!
//! #[tokio::main]
//! async fn main() -> stellate_instrumentation::Result<()> {
//!     let config = StellateConfig::new("my-service", "my-token")?;
//!     let reporter = Reporter::new(config)?;
//!
//!     // Returns immediately; the request runs in the background
//!     reporter.send(Endpoint::Log, r#"{"operation":"{ me { id } }"}"#.to_string());
//!     Ok(())
//! }
//! ```

pub mod transport;

pub use transport::{HttpTransport, ReportRequest, Transport};

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::Instrument;

use crate::config::StellateConfig;
use crate::error::{Result, StellateError};
use crate::telemetry::{FailureReason, ReporterMetrics};

/// Header carrying the token for the log endpoint
pub const LOGGING_TOKEN_HEADER: &str = "Stellate-Logging-Token";

/// Header carrying the token for the schema endpoint
pub const SCHEMA_TOKEN_HEADER: &str = "Stellate-Schema-Token";

/// Collector endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Per-request metrics
    Log,
    /// Schema snapshot
    Schema,
}

impl Endpoint {
    /// URL path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Log => "log",
            Endpoint::Schema => "schema",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatches report payloads to the collector
#[derive(Clone)]
pub struct Reporter {
    config: Arc<StellateConfig>,
    transport: Arc<dyn Transport>,
    runtime: Handle,
    metrics: Option<Arc<ReporterMetrics>>,
}

impl Reporter {
    /// Create a reporter using the HTTP transport on the current tokio runtime
    pub fn new(config: StellateConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()?))
    }

    /// Create a reporter with a custom transport on the current tokio runtime
    pub fn with_transport(config: StellateConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            StellateError::Runtime(format!("Reporter must be created inside a tokio runtime: {}", e))
        })?;

        Ok(Self {
            config: Arc::new(config),
            transport,
            runtime,
            metrics: None,
        })
    }

    /// Spawn deliveries on a specific runtime instead of the current one
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.runtime = handle;
        self
    }

    /// Record delivery outcomes in prometheus counters
    pub fn with_metrics(mut self, metrics: Arc<ReporterMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The service identity reports are sent for
    pub fn config(&self) -> &StellateConfig {
        &self.config
    }

    /// Delivery metrics, if enabled
    pub fn metrics(&self) -> Option<&Arc<ReporterMetrics>> {
        self.metrics.as_ref()
    }

    /// Build the outbound request for a payload without sending it
    pub fn build_request(&self, endpoint: Endpoint, payload: String) -> ReportRequest {
        ReportRequest {
            endpoint,
            url: self.config.endpoint_url(endpoint),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                (LOGGING_TOKEN_HEADER, self.config.logging_token.clone()),
                (SCHEMA_TOKEN_HEADER, self.config.schema_token.clone()),
            ],
            body: payload,
        }
    }

    /// Send a JSON payload in the background.
    ///
    /// Returns as soon as the delivery task is spawned. Dropping the handle
    /// detaches the task; awaiting it only waits for delivery to finish, it
    /// never yields an error.
    pub fn send(&self, endpoint: Endpoint, payload: String) -> JoinHandle<()> {
        let request = self.build_request(endpoint, payload);
        let transport = Arc::clone(&self.transport);
        let metrics = self.metrics.clone();

        if let Some(metrics) = &metrics {
            metrics.record_dispatched(endpoint);
        }

        let span = tracing::debug_span!("stellate_report", endpoint = %endpoint);
        self.runtime.spawn(
            deliver(transport, request, metrics)
                .instrument(span)
                .with_current_subscriber(),
        )
    }

    /// Serialize `payload` and send it in the background
    pub fn send_json<T: Serialize>(&self, endpoint: Endpoint, payload: &T) -> Result<JoinHandle<()>> {
        let body = serde_json::to_string(payload)?;
        Ok(self.send(endpoint, body))
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

async fn deliver(
    transport: Arc<dyn Transport>,
    request: ReportRequest,
    metrics: Option<Arc<ReporterMetrics>>,
) {
    let endpoint = request.endpoint;
    let url = request.url.clone();

    match transport.post(request).await {
        Ok(status) if status.as_u16() >= 300 => {
            tracing::warn!(
                endpoint = %endpoint,
                url = %url,
                status = status.as_u16(),
                "Failed to send Stellate request"
            );
            if let Some(metrics) = &metrics {
                metrics.record_failed(endpoint, FailureReason::Status);
            }
        }
        Ok(status) => {
            tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "Stellate request delivered");
            if let Some(metrics) = &metrics {
                metrics.record_delivered(endpoint);
            }
        }
        Err(e) => {
            tracing::warn!(
                endpoint = %endpoint,
                url = %url,
                error = %e,
                "Failed to send Stellate request"
            );
            if let Some(metrics) = &metrics {
                metrics.record_failed(endpoint, FailureReason::Transport);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;

    struct StatusTransport(StatusCode);

    #[async_trait]
    impl Transport for StatusTransport {
        async fn post(&self, _request: ReportRequest) -> Result<StatusCode> {
            Ok(self.0)
        }
    }

    fn test_config() -> StellateConfig {
        StellateConfig::builder("svc", "log-token")
            .schema_token("schema-token")
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Log.as_str(), "log");
        assert_eq!(Endpoint::Schema.to_string(), "schema");
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let err = Reporter::with_transport(test_config(), Arc::new(StatusTransport(StatusCode::OK)))
            .unwrap_err();
        assert!(matches!(err, StellateError::Runtime(_)));
    }

    #[tokio::test]
    async fn test_build_request() {
        let reporter =
            Reporter::with_transport(test_config(), Arc::new(StatusTransport(StatusCode::OK))).unwrap();
        let request = reporter.build_request(Endpoint::Schema, "{}".to_string());

        assert_eq!(request.url, "https://svc.stellate.sh/schema");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header(LOGGING_TOKEN_HEADER), Some("log-token"));
        assert_eq!(request.header(SCHEMA_TOKEN_HEADER), Some("schema-token"));
        assert_eq!(request.body, "{}");
    }

    #[tokio::test]
    async fn test_metrics_follow_status() {
        let registry = prometheus::Registry::new();
        let metrics = Arc::new(ReporterMetrics::new(&registry).unwrap());

        let ok = Reporter::with_transport(test_config(), Arc::new(StatusTransport(StatusCode::OK)))
            .unwrap()
            .with_metrics(Arc::clone(&metrics));
        let rejected = Reporter::with_transport(
            test_config(),
            Arc::new(StatusTransport(StatusCode::UNAUTHORIZED)),
        )
        .unwrap()
        .with_metrics(Arc::clone(&metrics));

        ok.send(Endpoint::Log, "{}".to_string()).await.unwrap();
        rejected.send(Endpoint::Log, "{}".to_string()).await.unwrap();

        assert_eq!(metrics.dispatched(Endpoint::Log), 2);
        assert_eq!(metrics.delivered(Endpoint::Log), 1);
        assert_eq!(metrics.failed(Endpoint::Log, FailureReason::Status), 1);
    }

    #[tokio::test]
    async fn test_redirect_status_counts_as_failure() {
        let registry = prometheus::Registry::new();
        let metrics = Arc::new(ReporterMetrics::new(&registry).unwrap());
        let reporter = Reporter::with_transport(
            test_config(),
            Arc::new(StatusTransport(StatusCode::MULTIPLE_CHOICES)),
        )
        .unwrap()
        .with_metrics(Arc::clone(&metrics));

        reporter.send(Endpoint::Schema, "{}".to_string()).await.unwrap();
        assert_eq!(metrics.failed(Endpoint::Schema, FailureReason::Status), 1);
    }

    #[tokio::test]
    async fn test_send_json_serializes() {
        let reporter =
            Reporter::with_transport(test_config(), Arc::new(StatusTransport(StatusCode::OK))).unwrap();
        let handle = reporter
            .send_json(Endpoint::Log, &serde_json::json!({ "operation": "{ a }" }))
            .unwrap();
        handle.await.unwrap();
    }
}
