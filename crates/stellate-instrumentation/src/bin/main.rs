//! Stellate CLI
//!
//! # Usage
//!
//! ```bash
//! # Hash a string the way the collector does
//! stellate hash 'query { me { id } }'
//!
//! # Push a schema snapshot from an introspection result
//! STELLATE_SERVICE_NAME=my-service STELLATE_TOKEN=... stellate push-schema --file introspection.json
//!
//! # Show resolved collector endpoints
//! stellate check-config --service my-service --token ...
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Collector did not accept the report
//! - 3: Invalid input, arguments or configuration
//! - 10: Internal error

use clap::Parser;
use stellate_instrumentation::{run_cli, StellateCli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = StellateCli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}
