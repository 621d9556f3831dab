//! Self-telemetry for the reporter
//!
//! Prometheus counters describing how many reports were dispatched,
//! delivered and dropped. They are updated from the detached delivery tasks
//! and never block the caller.

pub mod metrics;

pub use metrics::{FailureReason, ReporterMetrics, ReporterMetricsRegistry};

use thiserror::Error;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
