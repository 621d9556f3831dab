//! CLI command definitions for the `stellate` binary
//!
//! Hash arbitrary content the way the collector does, push a schema snapshot
//! from an introspection result on disk, and show the resolved collector
//! endpoints.

use clap::{ArgGroup, Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::ExitCode;
use crate::config::StellateConfig;
use crate::contracts::SchemaPayload;
use crate::error::{Result, StellateError};
use crate::reporter::{Endpoint, Reporter};
use crate::telemetry::{FailureReason, ReporterMetrics, ReporterMetricsRegistry};

/// Stellate CLI
///
/// Utilities for GraphQL metrics logging and schema sync with Stellate.
#[derive(Parser, Debug)]
#[command(name = "stellate")]
#[command(about = "Stellate - GraphQL metrics logging and schema sync", long_about = None)]
#[command(version)]
pub struct StellateCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(subcommand)]
    pub command: StellateCommands,
}

/// Service identity, from flags or `STELLATE_*` environment variables
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Stellate service name
    #[arg(long = "service", env = "STELLATE_SERVICE_NAME", global = true)]
    pub service_name: Option<String>,

    /// Logging token (also used for schema sync unless --schema-token is set)
    #[arg(long, env = "STELLATE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Token for schema sync
    #[arg(long, env = "STELLATE_SCHEMA_TOKEN", global = true, hide_env_values = true)]
    pub schema_token: Option<String>,

    /// Collector domain
    #[arg(long, env = "STELLATE_COLLECTOR_DOMAIN", global = true)]
    pub collector_domain: Option<String>,

    /// Collector base URL override
    #[arg(long, env = "STELLATE_COLLECTOR_URL", global = true)]
    pub collector_url: Option<String>,
}

impl ServiceArgs {
    /// Resolve into a validated config
    pub fn to_config(&self) -> Result<StellateConfig> {
        let service_name = self
            .service_name
            .clone()
            .ok_or_else(|| StellateError::config("--service or STELLATE_SERVICE_NAME is required"))?;
        let token = self
            .token
            .clone()
            .ok_or_else(|| StellateError::config("--token or STELLATE_TOKEN is required"))?;

        let mut builder = StellateConfig::builder(service_name, token);
        if let Some(schema_token) = &self.schema_token {
            builder = builder.schema_token(schema_token.clone());
        }
        if let Some(domain) = &self.collector_domain {
            builder = builder.collector_domain(domain.clone());
        }
        if let Some(url) = &self.collector_url {
            builder = builder.collector_url(url.clone());
        }
        builder.build()
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum StellateCommands {
    /// Print the content hash of a string or file
    #[command(group(ArgGroup::new("source").required(true).args(["input", "file"])))]
    Hash {
        /// String to hash
        input: Option<String>,

        /// Hash the contents of a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Push a schema snapshot from an introspection result file
    ///
    /// Accepts either a full execution result (`{"data": {"__schema": ...}}`)
    /// or bare introspection data (`{"__schema": ...}`).
    PushSchema {
        /// Path to the introspection JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the resolved collector endpoints
    CheckConfig,
}

/// Execute the `hash` command
pub fn execute_hash(input: Option<String>, file: Option<PathBuf>) -> Result<ExitCode> {
    let content = match (input, file) {
        (Some(input), _) => input,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err(StellateError::invalid_input("nothing to hash")),
    };
    println!("{}", crate::hash::hash(&content));
    Ok(ExitCode::Success)
}

/// Read an introspection result and wrap it as a schema payload
pub fn load_schema_payload(path: &Path) -> Result<SchemaPayload> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| StellateError::invalid_input(format!("{}: {}", path.display(), e)))?;
    SchemaPayload::from_introspection_json(value).ok_or_else(|| {
        StellateError::invalid_input(format!(
            "{} does not contain introspection data",
            path.display()
        ))
    })
}

/// Execute the `push-schema` command and wait for the collector's answer
pub async fn execute_push_schema(service: &ServiceArgs, file: PathBuf) -> Result<ExitCode> {
    let config = service.to_config()?;
    let payload = load_schema_payload(&file)?;

    let registry = ReporterMetricsRegistry::new()?;
    let metrics = registry.reporter();
    let reporter = Reporter::new(config)?.with_metrics(Arc::clone(&metrics));

    tracing::info!(url = %reporter.config().endpoint_url(Endpoint::Schema), "Pushing schema");
    reporter
        .send_json(Endpoint::Schema, &payload)?
        .await
        .map_err(|e| StellateError::Runtime(e.to_string()))?;

    if metrics.delivered(Endpoint::Schema) == 1 {
        println!("Schema pushed to {}", reporter.config().service_name);
        Ok(ExitCode::Success)
    } else {
        eprintln!("Schema push failed: {}", schema_failure_reason(&metrics));
        Ok(ExitCode::DeliveryFailed)
    }
}

/// Explain a failed schema push from the delivery counters
pub fn schema_failure_reason(metrics: &ReporterMetrics) -> &'static str {
    if metrics.failed(Endpoint::Schema, FailureReason::Status) > 0 {
        "collector rejected the request"
    } else {
        "collector unreachable"
    }
}

/// Resolved endpoints of a config, without its tokens
pub fn config_summary(config: &StellateConfig) -> serde_json::Value {
    json!({
        "service": config.service_name,
        "logUrl": config.endpoint_url(Endpoint::Log),
        "schemaUrl": config.endpoint_url(Endpoint::Schema),
        "sharedToken": config.logging_token == config.schema_token,
    })
}

/// Execute the `check-config` command
pub fn execute_check_config(service: &ServiceArgs) -> Result<ExitCode> {
    let config = service.to_config()?;
    println!("{}", serde_json::to_string_pretty(&config_summary(&config))?);
    Ok(ExitCode::Success)
}
