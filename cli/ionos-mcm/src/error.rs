//! Error handling and display for the CLI.

use colored::Colorize;
use ionos_mcm_provider::{Code, DriverError};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No API credentials. Set IONOS_USER and IONOS_PASSWORD or pass --user/--password.")]
    MissingCredentials,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let Some(driver_err) = err.downcast_ref::<DriverError>() else {
        return;
    };

    let hint = match driver_err.code() {
        Code::InvalidArgument => "Hint: Check the provider spec and the provider ID.",
        Code::NotFound => "Hint: The machine does not exist (anymore).",
        Code::Unavailable => "Hint: The cloud API could not be reached or rejected the call.",
        Code::Canceled => "Hint: The request was interrupted or the datacenter is unknown.",
        Code::Unimplemented => "Hint: This operation is not supported by the provider.",
        Code::Internal | Code::Aborted => return,
    };
    eprintln!("\n{}", hint.yellow());
}
