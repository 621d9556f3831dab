//! Wire contracts for the Stellate collector
//!
//! Bodies posted to the `log` and `schema` endpoints. Field names follow the
//! collector's camelCase JSON schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method reported when the host does not supply one
pub const DEFAULT_METHOD: &str = "POST";

/// Status code reported when the host does not supply one
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Per-request metrics posted to the `log` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload {
    /// GraphQL document text as received
    pub operation: String,

    /// Transport method label
    pub method: String,

    /// UTF-8 byte length of the serialized response
    pub response_size: usize,

    /// Rolling hash of the serialized response
    pub response_hash: u32,

    /// Execution time in whole milliseconds
    pub elapsed: u64,

    /// Selected operation name, if any
    pub operation_name: Option<String>,

    /// Rolling hash of the serialized variables
    pub variables_hash: u32,

    /// GraphQL errors, or null when the execution produced none
    pub errors: Option<Vec<Value>>,

    /// Status label for the response
    pub status_code: u16,
}

impl LogPayload {
    /// True when the execution reported GraphQL-level errors
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Schema snapshot posted to the `schema` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPayload {
    /// `data` of the introspection query result
    pub schema: Value,
}

impl SchemaPayload {
    /// Wrap introspection data
    pub fn new(schema: Value) -> Self {
        Self { schema }
    }

    /// Build from a file's JSON, accepting either a full execution result
    /// (`{"data": {"__schema": ...}}`) or bare introspection data
    /// (`{"__schema": ...}`)
    pub fn from_introspection_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(mut map) => {
                if map.contains_key("__schema") {
                    return Some(Self::new(Value::Object(map)));
                }
                match map.remove("data") {
                    Some(data @ Value::Object(_)) => Some(Self::new(data)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
