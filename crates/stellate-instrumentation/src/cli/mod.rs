//! CLI module for the `stellate` binary

pub mod commands;

pub use commands::{ServiceArgs, StellateCli, StellateCommands};

use crate::error::StellateError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// The collector did not accept the report
    DeliveryFailed = 1,
    /// Invalid input, arguments or configuration
    InvalidInput = 3,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Run the CLI with the given arguments and return the exit code
pub async fn run(cli: StellateCli) -> Result<ExitCode, StellateError> {
    match cli.command {
        StellateCommands::Hash { input, file } => commands::execute_hash(input, file),
        StellateCommands::PushSchema { file } => {
            commands::execute_push_schema(&cli.service, file).await
        }
        StellateCommands::CheckConfig => commands::execute_check_config(&cli.service),
    }
}
