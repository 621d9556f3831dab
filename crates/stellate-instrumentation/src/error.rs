//! Error types for Stellate instrumentation
//!
//! None of these ever reach the host's request path: the observer hooks log
//! and swallow them. They surface only from construction, configuration and
//! explicit serialization entry points.

use thiserror::Error;

/// Main error type for instrumentation operations
#[derive(Error, Debug)]
pub enum StellateError {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network-level failure talking to the collector
    #[error("Transport error: {0}")]
    Transport(String),

    /// No async runtime available to dispatch reports on
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// The host engine failed to execute a query on our behalf
    #[error("Host execution error: {0}")]
    Host(String),

    /// Metrics registry failure
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] crate::telemetry::TelemetryError),

    /// File access or I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StellateError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        StellateError::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        StellateError::InvalidInput(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        StellateError::Transport(msg.into())
    }

    /// Create a host execution error
    pub fn host(msg: impl Into<String>) -> Self {
        StellateError::Host(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StellateError::Config(_) | StellateError::InvalidInput(_) | StellateError::Io(_)
        )
    }
}

impl From<reqwest::Error> for StellateError {
    fn from(err: reqwest::Error) -> Self {
        StellateError::Transport(err.to_string())
    }
}

/// Result type alias for instrumentation operations
pub type Result<T> = std::result::Result<T, StellateError>;
