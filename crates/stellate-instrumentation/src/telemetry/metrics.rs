//! Prometheus metrics for report delivery
//!
//! - `stellate_reports_dispatched_total` (counter) - reports handed to the transport, by endpoint
//! - `stellate_reports_delivered_total` (counter) - reports the collector accepted, by endpoint
//! - `stellate_reports_failed_total` (counter) - failed reports, by endpoint and reason
//! - `stellate_schema_syncs_total` (counter) - schema syncs issued
//!
//! # Example
//!
//! ```rust
//! use stellate_instrumentation::telemetry::ReporterMetricsRegistry;
//! use stellate_instrumentation::reporter::Endpoint;
//!
//! let registry = ReporterMetricsRegistry::new().unwrap();
//! registry.reporter().record_dispatched(Endpoint::Log);
//! assert!(registry.encode_text().unwrap().contains("stellate_reports_dispatched_total"));
//! ```

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

use super::{Result, TelemetryError};
use crate::reporter::Endpoint;

/// Why a report did not reach the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Collector answered with status >= 300
    Status,
    /// Request never got a response
    Transport,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Status => "status",
            FailureReason::Transport => "transport",
        }
    }
}

/// Report delivery metrics
pub struct ReporterMetrics {
    dispatched_total: IntCounterVec,
    delivered_total: IntCounterVec,
    failed_total: IntCounterVec,
    schema_syncs_total: IntCounter,
}

impl ReporterMetrics {
    /// Create metrics and register them with the provided registry
    pub fn new(registry: &Registry) -> Result<Self> {
        let dispatched_total = IntCounterVec::new(
            Opts::new(
                "reports_dispatched_total",
                "Total number of reports handed to the transport",
            )
            .namespace("stellate"),
            &["endpoint"],
        )?;

        let delivered_total = IntCounterVec::new(
            Opts::new(
                "reports_delivered_total",
                "Total number of reports accepted by the collector",
            )
            .namespace("stellate"),
            &["endpoint"],
        )?;

        let failed_total = IntCounterVec::new(
            Opts::new(
                "reports_failed_total",
                "Total number of reports that failed to reach the collector",
            )
            .namespace("stellate"),
            &["endpoint", "reason"],
        )?;

        let schema_syncs_total = IntCounter::new(
            "stellate_schema_syncs_total",
            "Total number of schema syncs issued",
        )?;

        registry.register(Box::new(dispatched_total.clone()))?;
        registry.register(Box::new(delivered_total.clone()))?;
        registry.register(Box::new(failed_total.clone()))?;
        registry.register(Box::new(schema_syncs_total.clone()))?;

        Ok(Self {
            dispatched_total,
            delivered_total,
            failed_total,
            schema_syncs_total,
        })
    }

    /// Record a report handed to the transport
    pub fn record_dispatched(&self, endpoint: Endpoint) {
        self.dispatched_total
            .with_label_values(&[endpoint.as_str()])
            .inc();
    }

    /// Record a report the collector accepted
    pub fn record_delivered(&self, endpoint: Endpoint) {
        self.delivered_total
            .with_label_values(&[endpoint.as_str()])
            .inc();
    }

    /// Record a failed report
    pub fn record_failed(&self, endpoint: Endpoint, reason: FailureReason) {
        self.failed_total
            .with_label_values(&[endpoint.as_str(), reason.as_str()])
            .inc();
    }

    /// Record a schema sync being issued
    pub fn record_schema_sync(&self) {
        self.schema_syncs_total.inc();
    }

    pub fn dispatched(&self, endpoint: Endpoint) -> u64 {
        self.dispatched_total
            .with_label_values(&[endpoint.as_str()])
            .get()
    }

    pub fn delivered(&self, endpoint: Endpoint) -> u64 {
        self.delivered_total
            .with_label_values(&[endpoint.as_str()])
            .get()
    }

    pub fn failed(&self, endpoint: Endpoint, reason: FailureReason) -> u64 {
        self.failed_total
            .with_label_values(&[endpoint.as_str(), reason.as_str()])
            .get()
    }

    pub fn schema_syncs(&self) -> u64 {
        self.schema_syncs_total.get()
    }
}

/// Registry owning the reporter metrics
pub struct ReporterMetricsRegistry {
    registry: Arc<Registry>,
    reporter: Arc<ReporterMetrics>,
}

impl ReporterMetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let reporter = Arc::new(ReporterMetrics::new(&registry)?);
        Ok(Self { registry, reporter })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Get the reporter metrics
    pub fn reporter(&self) -> Arc<ReporterMetrics> {
        Arc::clone(&self.reporter)
    }

    /// Gather all metrics in Prometheus format
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics as text for scraping
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| TelemetryError::Metrics(prometheus::Error::Msg(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_metrics() -> ReporterMetrics {
        ReporterMetrics::new(&Registry::new()).unwrap()
    }

    #[test]
    fn test_dispatch_counts_by_endpoint() {
        let metrics = create_test_metrics();

        metrics.record_dispatched(Endpoint::Log);
        metrics.record_dispatched(Endpoint::Log);
        metrics.record_dispatched(Endpoint::Schema);

        assert_eq!(metrics.dispatched(Endpoint::Log), 2);
        assert_eq!(metrics.dispatched(Endpoint::Schema), 1);
    }

    #[test]
    fn test_failures_by_reason() {
        let metrics = create_test_metrics();

        metrics.record_failed(Endpoint::Log, FailureReason::Status);
        metrics.record_failed(Endpoint::Log, FailureReason::Transport);
        metrics.record_failed(Endpoint::Log, FailureReason::Transport);

        assert_eq!(metrics.failed(Endpoint::Log, FailureReason::Status), 1);
        assert_eq!(metrics.failed(Endpoint::Log, FailureReason::Transport), 2);
        assert_eq!(metrics.failed(Endpoint::Schema, FailureReason::Status), 0);
    }

    #[test]
    fn test_schema_syncs() {
        let metrics = create_test_metrics();
        metrics.record_schema_sync();
        assert_eq!(metrics.schema_syncs(), 1);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ReporterMetrics::new(&registry).unwrap();
        assert!(ReporterMetrics::new(&registry).is_err());
    }

    #[test]
    fn test_encode_text() {
        let registry = ReporterMetricsRegistry::new().unwrap();

        registry.reporter().record_dispatched(Endpoint::Schema);
        registry.reporter().record_delivered(Endpoint::Schema);

        let text = registry.encode_text().unwrap();
        assert!(text.contains("stellate_reports_dispatched_total"));
        assert!(text.contains("stellate_reports_delivered_total"));
        assert!(text.contains("endpoint=\"schema\""));
    }
}
