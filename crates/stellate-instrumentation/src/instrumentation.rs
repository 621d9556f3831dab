//! Execution lifecycle hooks
//!
//! [`StellateInstrumentation`] is what a host installs. It implements
//! [`RequestObserver`] to log every execution and [`SchemaObserver`] to push
//! a schema snapshot the first time a schema is observed. Both hooks do
//! their network work on detached tasks and cannot fail from the host's
//! point of view.

use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::StellateConfig;
use crate::contracts::{LogPayload, SchemaPayload, DEFAULT_METHOD, DEFAULT_STATUS_CODE};
use crate::error::Result;
use crate::hash::{hash, hash_json};
use crate::host::{ExecutionInput, ExecutionResult, QueryRunner, RequestObserver, SchemaObserver};
use crate::introspection::INTROSPECTION_QUERY;
use crate::reporter::{Endpoint, Reporter};

/// At-most-once guard for schema sync
#[derive(Debug, Default)]
pub struct SchemaSyncState {
    synced: AtomicBool,
}

impl SchemaSyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the sync. Exactly one caller ever gets `true`.
    pub fn try_claim(&self) -> bool {
        self.synced
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }
}

/// State carried from `on_begin` to `on_complete`
#[derive(Debug)]
pub struct RequestContext {
    started: Instant,
    operation: String,
    operation_name: Option<String>,
    variables_hash: u32,
    method: String,
}

impl RequestContext {
    /// Time since the execution began
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Reports request metrics and the schema snapshot to Stellate
#[derive(Debug)]
pub struct StellateInstrumentation {
    reporter: Reporter,
    schema_sync: SchemaSyncState,
}

impl StellateInstrumentation {
    /// Create instrumentation on top of an existing reporter
    pub fn new(reporter: Reporter) -> Self {
        Self {
            reporter,
            schema_sync: SchemaSyncState::new(),
        }
    }

    /// Create instrumentation reporting over HTTP on the current tokio runtime
    pub fn from_config(config: StellateConfig) -> Result<Self> {
        Ok(Self::new(Reporter::new(config)?))
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Whether this instance has already issued its schema sync
    pub fn has_synced_schema(&self) -> bool {
        self.schema_sync.has_synced()
    }

    /// Run a host execution between `on_begin` and `on_complete`.
    ///
    /// If the returned future is dropped before the execution finishes, no
    /// log is sent for it.
    pub async fn instrument<F>(&self, input: &ExecutionInput, execution: F) -> ExecutionResult
    where
        F: Future<Output = ExecutionResult>,
    {
        let context = self.on_begin(input);
        let result = execution.await;
        self.on_complete(context, &result);
        result
    }

    fn sync_schema<S: QueryRunner + ?Sized>(&self, schema: &S) {
        if !self.schema_sync.try_claim() {
            return;
        }

        let result = match schema.run_query(INTROSPECTION_QUERY) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Introspection query failed, schema not synced");
                return;
            }
        };

        let error_count = result.errors.len();
        let data = match result.data {
            Some(data) if !data.is_null() => data,
            _ => {
                tracing::warn!(
                    errors = error_count,
                    "Introspection query returned no data, schema not synced"
                );
                return;
            }
        };

        match self
            .reporter
            .send_json(Endpoint::Schema, &SchemaPayload::new(data))
        {
            Ok(_) => {
                if let Some(metrics) = self.reporter.metrics() {
                    metrics.record_schema_sync();
                }
                tracing::info!(
                    service = %self.reporter.config().service_name,
                    "Schema sync issued"
                );
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize schema payload"),
        }
    }
}

/// Assemble the log body for a finished execution
pub fn log_payload(context: RequestContext, result: &ExecutionResult) -> LogPayload {
    let elapsed = u64::try_from(context.elapsed().as_millis()).unwrap_or(u64::MAX);
    let response = result.to_specification().to_string();

    LogPayload {
        operation: context.operation,
        method: context.method,
        response_size: response.len(),
        response_hash: hash(&response),
        elapsed,
        operation_name: context.operation_name,
        variables_hash: context.variables_hash,
        errors: if result.errors.is_empty() {
            None
        } else {
            Some(result.errors.clone())
        },
        status_code: result.status_code.unwrap_or(DEFAULT_STATUS_CODE),
    }
}

impl RequestObserver for StellateInstrumentation {
    type Context = RequestContext;

    fn on_begin(&self, input: &ExecutionInput) -> RequestContext {
        let started = Instant::now();
        RequestContext {
            started,
            operation: input.query.clone(),
            operation_name: input.operation_name.clone(),
            variables_hash: hash_json(&Value::Object(input.variables.clone())),
            method: input
                .method
                .clone()
                .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
        }
    }

    fn on_complete(&self, context: RequestContext, result: &ExecutionResult) {
        let payload = log_payload(context, result);

        tracing::debug!(
            operation_name = ?payload.operation_name,
            elapsed_ms = payload.elapsed,
            response_size = payload.response_size,
            has_errors = payload.has_errors(),
            "Reporting execution"
        );

        if let Err(e) = self.reporter.send_json(Endpoint::Log, &payload) {
            tracing::error!(error = %e, "Failed to serialize log payload");
        }
    }
}

impl<S: QueryRunner> SchemaObserver<S> for StellateInstrumentation {
    fn on_schema(&self, schema: S) -> S {
        self.sync_schema(&schema);
        schema
    }
}
