//! Host engine contracts
//!
//! The instrumentation never depends on a particular GraphQL engine. Hosts
//! translate their own request/response types into [`ExecutionInput`] and
//! [`ExecutionResult`], call the observer traits at the matching lifecycle
//! points, and expose their schema through [`QueryRunner`] so the
//! introspection snapshot can be taken.

use serde_json::{Map, Value};

use crate::error::Result;

/// What the host knows about a request before executing it
#[derive(Debug, Clone, Default)]
pub struct ExecutionInput {
    /// GraphQL document text
    pub query: String,

    /// Operation selected from the document
    pub operation_name: Option<String>,

    /// Request variables
    pub variables: Map<String, Value>,

    /// Transport method the request arrived with, when the host knows it
    pub method: Option<String>,
}

impl ExecutionInput {
    /// Create input for a query with no variables
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the operation name
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set the variables
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    /// Set the transport method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Outcome of an execution, treated as opaque JSON
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    /// `data` entry; `None` when the engine produced no data entry at all
    pub data: Option<Value>,

    /// GraphQL errors in their serialized form
    pub errors: Vec<Value>,

    /// `extensions` entry
    pub extensions: Option<Value>,

    /// Status the host answered with, when it knows it
    pub status_code: Option<u16>,
}

impl ExecutionResult {
    /// Successful result carrying data
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    /// Result for an execution that failed before producing data
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![serde_json::json!({ "message": message.into() })],
            ..Default::default()
        }
    }

    /// Add a GraphQL error
    pub fn with_error(mut self, error: Value) -> Self {
        self.errors.push(error);
        self
    }

    /// Set the status the host answered with
    pub fn with_status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Response as defined by the GraphQL spec: `data` when present, `errors`
    /// only when non-empty, `extensions` when present
    pub fn to_specification(&self) -> Value {
        let mut map = Map::new();
        if !self.errors.is_empty() {
            map.insert("errors".to_string(), Value::Array(self.errors.clone()));
        }
        if let Some(data) = &self.data {
            map.insert("data".to_string(), data.clone());
        }
        if let Some(extensions) = &self.extensions {
            map.insert("extensions".to_string(), extensions.clone());
        }
        Value::Object(map)
    }
}

/// A schema the host can execute queries against
pub trait QueryRunner {
    /// Execute `query` against this schema and return its result
    fn run_query(&self, query: &str) -> Result<ExecutionResult>;
}

impl<T: QueryRunner + ?Sized> QueryRunner for std::sync::Arc<T> {
    fn run_query(&self, query: &str) -> Result<ExecutionResult> {
        (**self).run_query(query)
    }
}

impl<T: QueryRunner + ?Sized> QueryRunner for &T {
    fn run_query(&self, query: &str) -> Result<ExecutionResult> {
        (**self).run_query(query)
    }
}

/// Called by the host around every GraphQL execution
pub trait RequestObserver {
    /// State carried from begin to complete
    type Context;

    /// Called before the host starts executing
    fn on_begin(&self, input: &ExecutionInput) -> Self::Context;

    /// Called once the execution finished, successfully or not
    fn on_complete(&self, context: Self::Context, result: &ExecutionResult);
}

/// Called by the host for every schema it presents
pub trait SchemaObserver<S> {
    /// Observe `schema` and hand it back unchanged
    fn on_schema(&self, schema: S) -> S;
}
