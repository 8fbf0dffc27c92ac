//! Floating IP LAN commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use ionos_mcm_cloud::ClientProvider;
use ionos_mcm_networking::NetworkAttacher;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_single, print_success};

use super::CommandContext;

/// LAN commands.
#[derive(Debug, Args)]
pub struct LanCommand {
    #[command(subcommand)]
    command: LanSubcommand,
}

#[derive(Debug, Subcommand)]
enum LanSubcommand {
    /// Create a public LAN failing over to a free floating IP.
    EnsureFloating(EnsureFloatingArgs),

    /// Delete every LAN with the given name.
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
struct EnsureFloatingArgs {
    /// Datacenter ID.
    #[arg(long)]
    datacenter: String,

    /// IP block to draw the floating IP from.
    #[arg(long)]
    pool: String,

    /// LAN name.
    #[arg(long)]
    name: String,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Datacenter ID.
    #[arg(long)]
    datacenter: String,

    /// LAN name.
    #[arg(long)]
    name: String,
}

#[derive(Debug, Serialize, Tabled)]
struct LanRow {
    #[tabled(rename = "LAN")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,
}

impl LanCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let api = ctx.registry.client_for(&ctx.credentials).await?;
        let attacher = NetworkAttacher::new(api.as_ref(), &ctx.config.poll, &ctx.request);

        match self.command {
            LanSubcommand::EnsureFloating(args) => {
                let id = attacher
                    .ensure_floating_lan(&args.datacenter, &args.pool, &args.name)
                    .await?;
                print_single(
                    &LanRow {
                        id,
                        name: args.name,
                    },
                    ctx.format,
                );
            }
            LanSubcommand::Remove(args) => {
                let removed = attacher
                    .remove_lans_named(&args.datacenter, &args.name)
                    .await?;
                print_success(&format!("Removed {removed} LAN(s) named {}", args.name));
            }
        }

        Ok(())
    }
}
