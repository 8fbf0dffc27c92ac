//! CLI commands.

mod lans;
mod machines;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ionos_mcm_cloud::{ClientRegistry, Credentials};
use ionos_mcm_provider::{MachineDriver, ProviderConfig, Secret, PASSWORD_KEY, USER_KEY};
use ionos_mcm_reconcile::RequestContext;
use tracing::warn;

use crate::error::CliError;
use crate::output::OutputFormat;

/// ionos-mcm - manage IONOS Cloud machines the way the machine controller does.
#[derive(Debug, Parser)]
#[command(name = "ionos-mcm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// API user.
    #[arg(long, global = true, env = "IONOS_USER")]
    user: Option<String>,

    /// API password.
    #[arg(long, global = true, env = "IONOS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Abort the operation after this many seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Provision a machine.
    Create(machines::CreateArgs),

    /// Delete a machine and its volumes.
    Delete(machines::DeleteArgs),

    /// Show the status of a machine.
    Status(machines::StatusArgs),

    /// List the machines of a machine class.
    List(machines::ListArgs),

    /// Manage floating IP LANs.
    Lan(lans::LanCommand),
}

impl Cli {
    pub fn json_logs(&self) -> bool {
        self.json_logs
    }

    /// Run the CLI command.
    pub async fn run(self, config: ProviderConfig) -> Result<()> {
        let credentials = match (self.user, self.password) {
            (Some(user), Some(password)) => Credentials::new(user, password),
            _ => return Err(CliError::MissingCredentials.into()),
        };

        let mut request = RequestContext::new();
        if let Some(secs) = self.timeout {
            request = request.with_timeout(Duration::from_secs(secs));
        }

        let interrupt = request.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling request");
                interrupt.cancel();
            }
        });

        let registry = Arc::new(ClientRegistry::new(&config.api_url, config.http_timeout));
        let ctx = CommandContext {
            driver: MachineDriver::new(registry.clone(), config.poll.clone()),
            registry,
            config,
            credentials,
            request,
            format: self.format,
        };

        match self.command {
            Commands::Create(args) => machines::create(ctx, args).await,
            Commands::Delete(args) => machines::delete(ctx, args).await,
            Commands::Status(args) => machines::status(ctx, args).await,
            Commands::List(args) => machines::list(ctx, args).await,
            Commands::Lan(cmd) => cmd.run(ctx).await,
        }
    }
}

/// Context shared by all commands.
pub struct CommandContext {
    pub driver: MachineDriver,
    pub registry: Arc<ClientRegistry>,
    pub config: ProviderConfig,
    pub credentials: Credentials,
    pub request: RequestContext,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Secret carrying the API credentials.
    pub fn secret(&self) -> Secret {
        Secret::new()
            .with(USER_KEY, self.credentials.user.as_str())
            .with(PASSWORD_KEY, self.credentials.password.as_str())
    }
}

pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path).await.map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) async fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let bytes = read_file(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::InvalidJson {
        path: path.display().to_string(),
        source,
    })
}
