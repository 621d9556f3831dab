//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use stellate_instrumentation::{
    ExecutionResult, QueryRunner, ReportRequest, Result, StellateConfig, StellateError, Transport,
};

pub fn test_config() -> StellateConfig {
    StellateConfig::new("test-service", "test-token").unwrap()
}

/// Records every request and answers with a fixed status
pub struct RecordingTransport {
    status: StatusCode,
    requests: Mutex<Vec<ReportRequest>>,
}

impl RecordingTransport {
    pub fn new(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            status,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ReportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Wait until at least `n` requests arrived, or give up after `timeout`
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.count() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, request: ReportRequest) -> Result<StatusCode> {
        self.requests.lock().unwrap().push(request);
        Ok(self.status)
    }
}

/// Blocks every request until released, to simulate a slow round-trip
pub struct GatedTransport {
    gate: Semaphore,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
}

impl GatedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn post(&self, _request: ReportRequest) -> Result<StatusCode> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| StellateError::transport(e.to_string()))?;
        permit.forget();
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(StatusCode::OK)
    }
}

/// Fails every request at the network level
pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn post(&self, _request: ReportRequest) -> Result<StatusCode> {
        Err(StellateError::transport("connection refused"))
    }
}

/// Counts `WARN` events
#[derive(Clone, Default)]
pub struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Schema stand-in that answers the introspection query
#[derive(Clone)]
pub struct FakeSchema {
    pub name: &'static str,
    result: Arc<Mutex<Option<Result<ExecutionResult>>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeSchema {
    pub fn new(name: &'static str) -> Self {
        Self::answering(name, Ok(ExecutionResult::from_data(introspection_data())))
    }

    pub fn answering(name: &'static str, result: Result<ExecutionResult>) -> Self {
        Self {
            name,
            result: Arc::new(Mutex::new(Some(result))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QueryRunner for FakeSchema {
    fn run_query(&self, query: &str) -> Result<ExecutionResult> {
        assert!(query.contains("__schema"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.result.lock().unwrap().take() {
            Some(result) => result,
            None => Err(StellateError::host("introspection already answered")),
        }
    }
}

pub fn introspection_data() -> Value {
    json!({
        "__schema": {
            "queryType": { "name": "Query" },
            "mutationType": null,
            "subscriptionType": null,
            "types": [
                { "kind": "OBJECT", "name": "Query", "fields": [
                    { "name": "me", "args": [], "type": { "kind": "OBJECT", "name": "User", "ofType": null } }
                ] }
            ],
            "directives": []
        }
    })
}
