//! Stellate Instrumentation
//!
//! GraphQL execution instrumentation that logs every request and its response
//! to Stellate, and synchronizes the GraphQL schema once on the first schema
//! observation.
//!
//! ## Features
//!
//! - **Request metrics**: latency, response size and hash, variables hash and
//!   GraphQL errors for every execution
//! - **Schema sync**: one introspection snapshot per instrumentation instance
//! - **Fire-and-forget**: reports run on detached tokio tasks and never touch
//!   the host's request path
//! - **Host-agnostic**: hosts plug in through [`RequestObserver`],
//!   [`SchemaObserver`] and [`QueryRunner`]
//!
//! ## Architecture
//!
//! 1. **Hash** (`hash`): rolling 32-bit content hash.
//! 2. **Contracts** (`contracts/`): JSON bodies for the `log` and `schema` endpoints.
//! 3. **Reporter** (`reporter/`): request construction and background delivery.
//! 4. **Instrumentation** (`instrumentation`): the lifecycle hooks.
//! 5. **Telemetry** (`telemetry/`): prometheus counters for delivery outcomes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use stellate_instrumentation::{
//!     ExecutionInput, ExecutionResult, RequestObserver, StellateConfig, StellateInstrumentation,
//! };
//!
//! #[tokio::main]
//! async fn main() -> stellate_instrumentation::Result<()> {
//!     let instrumentation =
//!         StellateInstrumentation::from_config(StellateConfig::from_env()?)?;
//!
//!     let input = ExecutionInput::new("query { me { id } }");
//!     let context = instrumentation.on_begin(&input);
//!     let result = ExecutionResult::from_data(json!({ "me": { "id": "1" } }));
//!     instrumentation.on_complete(context, &result);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod host;
pub mod instrumentation;
pub mod introspection;
pub mod reporter;
pub mod telemetry;

// Contracts module - located at ../contracts relative to src/
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use config::{StellateConfig, StellateConfigBuilder, DEFAULT_COLLECTOR_DOMAIN};
pub use contracts::{LogPayload, SchemaPayload};
pub use error::{Result, StellateError};
pub use hash::{hash, hash_json};
pub use host::{ExecutionInput, ExecutionResult, QueryRunner, RequestObserver, SchemaObserver};
pub use instrumentation::{RequestContext, SchemaSyncState, StellateInstrumentation};
pub use introspection::INTROSPECTION_QUERY;
pub use reporter::{Endpoint, HttpTransport, ReportRequest, Reporter, Transport};
pub use telemetry::{ReporterMetrics, ReporterMetricsRegistry};

pub use cli::{ExitCode, StellateCli, StellateCommands};

/// Library version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI application
///
/// This is the main entry point for the `stellate` binary.
pub async fn run_cli(cli: StellateCli) -> ExitCode {
    match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_user_error() {
                ExitCode::InvalidInput
            } else {
                ExitCode::InternalError
            }
        }
    }
}
