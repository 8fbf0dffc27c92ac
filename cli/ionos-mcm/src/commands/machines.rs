//! Machine lifecycle commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ionos_mcm_provider::{
    CreateMachineRequest, DeleteMachineRequest, GetMachineStatusRequest, ListMachinesRequest,
    Machine, MachineClass, USER_DATA_KEY,
};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_single, print_success};

use super::{read_file, read_json, CommandContext};

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Machine name, used for the server and its boot volume.
    name: String,

    /// Path to the provider spec (JSON).
    #[arg(long)]
    class: PathBuf,

    /// Path to the cloud-init user data.
    #[arg(long)]
    user_data: PathBuf,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Provider ID (ionos:///<datacenter>/<server>).
    provider_id: String,

    /// Machine name, for logging.
    #[arg(long, default_value = "")]
    name: String,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Provider ID (ionos:///<datacenter>/<server>).
    provider_id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path to the provider spec (JSON).
    #[arg(long)]
    class: PathBuf,
}

/// A machine as printed by the CLI.
#[derive(Debug, Clone, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct MachineRow {
    #[tabled(rename = "Provider ID")]
    provider_id: String,

    #[tabled(rename = "Node")]
    node_name: String,
}

fn machine_class(path: &std::path::Path, provider_spec: serde_json::Value) -> MachineClass {
    MachineClass {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        provider_spec,
    }
}

pub async fn create(ctx: CommandContext, args: CreateArgs) -> Result<()> {
    let provider_spec = read_json(&args.class).await?;
    let user_data = read_file(&args.user_data).await?;

    let request = CreateMachineRequest {
        machine: Machine::new(&args.name),
        machine_class: machine_class(&args.class, provider_spec),
        secret: ctx.secret().with(USER_DATA_KEY, user_data),
    };

    let response = ctx.driver.create_machine(&ctx.request, &request).await?;
    print_single(
        &MachineRow {
            provider_id: response.provider_id,
            node_name: response.node_name,
        },
        ctx.format,
    );
    Ok(())
}

pub async fn delete(ctx: CommandContext, args: DeleteArgs) -> Result<()> {
    let request = DeleteMachineRequest {
        machine: Machine::new(&args.name).with_provider_id(&args.provider_id),
        secret: ctx.secret(),
    };

    ctx.driver.delete_machine(&ctx.request, &request).await?;
    print_success(&format!("Deleted {}", args.provider_id));
    Ok(())
}

pub async fn status(ctx: CommandContext, args: StatusArgs) -> Result<()> {
    let request = GetMachineStatusRequest {
        machine: Machine::new("").with_provider_id(&args.provider_id),
        secret: ctx.secret(),
    };

    let response = ctx
        .driver
        .get_machine_status(&ctx.request, &request)
        .await?;
    print_single(
        &MachineRow {
            provider_id: response.provider_id,
            node_name: response.node_name,
        },
        ctx.format,
    );
    Ok(())
}

pub async fn list(ctx: CommandContext, args: ListArgs) -> Result<()> {
    let provider_spec = read_json(&args.class).await?;
    let request = ListMachinesRequest {
        machine_class: machine_class(&args.class, provider_spec),
        secret: ctx.secret(),
    };

    let response = ctx.driver.list_machines(&ctx.request, &request).await?;
    let rows: Vec<MachineRow> = response
        .machine_list
        .into_iter()
        .map(|(provider_id, node_name)| MachineRow {
            provider_id,
            node_name,
        })
        .collect();
    print_output(&rows, ctx.format);
    Ok(())
}
