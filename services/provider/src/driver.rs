//! Machine lifecycle operations.

use std::sync::Arc;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use ionos_mcm_cloud::{
    ApiError, ClientProvider, CloudApi, Collection, Image, OptionalExt, ResourceReference,
    Server, ServerCreate, ServerCreateEntities, ServerProperties, Volume, VolumeProperties,
};
use ionos_mcm_id::ProviderId;
use ionos_mcm_networking::{NetworkAttacher, NicConfig};
use ionos_mcm_reconcile::{wait_until_settled, PollConfig, RequestContext, Settling};
use tracing::{debug, info, warn};

use crate::error::DriverError;
use crate::labels::{self, OwnershipSelector};
use crate::ledger::ProvisioningLedger;
use crate::spec::ProviderSpec;
use crate::types::{
    CreateMachineRequest, CreateMachineResponse, DeleteMachineRequest, DeleteMachineResponse,
    GenerateMachineClassForMigrationRequest, GenerateMachineClassForMigrationResponse,
    GetMachineStatusRequest, GetMachineStatusResponse, GetVolumeIdsRequest, GetVolumeIdsResponse,
    ListMachinesRequest, ListMachinesResponse, Secret,
};

/// Volume type of every boot volume.
const VOLUME_TYPE: &str = "SSD";

/// Drives machine lifecycles against the cloud API.
///
/// Every operation runs as one linear sequence of API calls. Creations that
/// fail after the first resource was created are rolled back on a best
/// effort basis.
pub struct MachineDriver {
    provider: Arc<dyn ClientProvider>,
    poll: PollConfig,
}

impl MachineDriver {
    pub fn new(provider: Arc<dyn ClientProvider>, poll: PollConfig) -> Self {
        Self { provider, poll }
    }

    async fn client(&self, secret: &Secret) -> Result<Arc<dyn CloudApi>, DriverError> {
        self.provider
            .client_for(&secret.credentials())
            .await
            .map_err(|e| DriverError::unavailable(e.to_string()))
    }

    /// Provision a new machine.
    pub async fn create_machine(
        &self,
        ctx: &RequestContext,
        req: &CreateMachineRequest,
    ) -> Result<CreateMachineResponse, DriverError> {
        let machine = &req.machine;
        info!(machine = %machine.name, "Machine creation request has been received");

        if !machine.provider_id.is_empty() {
            return Err(DriverError::invalid_argument(format!(
                "machine {:?} is already provisioned as {}",
                machine.name, machine.provider_id
            )));
        }

        let spec = ProviderSpec::decode(&req.machine_class.provider_spec)
            .map_err(|e| DriverError::invalid_argument(e.to_string()))?;

        let user_data = req
            .secret
            .user_data()
            .ok_or_else(|| DriverError::internal("userData doesn't exist"))?;

        let api = self.client(&req.secret).await?;

        let image = api
            .find_image(&spec.image_id)
            .await
            .map_err(|e| DriverError::invalid_argument(e.to_string()))?;
        if !image.supports_cloud_init() {
            return Err(DriverError::invalid_argument(
                "imageID given doesn't belong to a cloud-init enabled image",
            ));
        }

        let provisioning = Provisioning {
            api: api.as_ref(),
            poll: &self.poll,
            ctx,
            spec: &spec,
            machine_name: &machine.name,
        };

        let mut ledger = ProvisioningLedger::new();
        match provisioning.run(&image, user_data, &mut ledger).await {
            Ok(response) => {
                info!(
                    machine = %machine.name,
                    provider_id = %response.provider_id,
                    "Machine creation request has been processed"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(
                    machine = %machine.name,
                    error = %err,
                    "Machine creation failed, rolling back"
                );
                provisioning.rollback(&ledger).await;
                Err(err)
            }
        }
    }

    /// Remove a machine together with its volumes.
    ///
    /// Deleting a machine that no longer exists succeeds.
    pub async fn delete_machine(
        &self,
        ctx: &RequestContext,
        req: &DeleteMachineRequest,
    ) -> Result<DeleteMachineResponse, DriverError> {
        let machine = &req.machine;
        info!(machine = %machine.name, "Machine deletion request has been received");

        let provider_id = ProviderId::parse(&machine.provider_id)
            .map_err(|e| DriverError::invalid_argument(e.to_string()))?;
        let datacenter_id = provider_id.datacenter_id().as_str();
        let server_id = provider_id.server_id().as_str();

        let api = self.client(&req.secret).await?;

        match api.stop_server(datacenter_id, server_id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                info!(machine = %machine.name, server_id, "VM does not exist");
                return Ok(DeleteMachineResponse::default());
            }
            Err(err) => return Err(DriverError::unavailable(err.to_string())),
        }

        let Some(server) =
            wait_for_server(api.as_ref(), &self.poll, ctx, datacenter_id, server_id).await?
        else {
            return Ok(DeleteMachineResponse::default());
        };

        for volume_id in server.attached_volume_ids() {
            debug!(server_id, volume_id, "Deleting volume");
            ignore_not_found(api.delete_volume(datacenter_id, volume_id).await)
                .map_err(|e| DriverError::unavailable(e.to_string()))?;
        }

        ignore_not_found(api.delete_server(datacenter_id, server_id).await)
            .map_err(|e| DriverError::unavailable(e.to_string()))?;

        info!(machine = %machine.name, "Machine deletion request has been processed");
        Ok(DeleteMachineResponse::default())
    }

    /// Look up a machine by its identity.
    pub async fn get_machine_status(
        &self,
        _ctx: &RequestContext,
        req: &GetMachineStatusRequest,
    ) -> Result<GetMachineStatusResponse, DriverError> {
        let machine = &req.machine;
        debug!(machine = %machine.name, "Get request has been received");

        if machine.provider_id.is_empty() {
            return Err(DriverError::not_found(format!(
                "Provider ID for machine {:?} is not defined",
                machine.name
            )));
        }

        let provider_id = ProviderId::parse(&machine.provider_id)
            .map_err(|e| DriverError::invalid_argument(e.to_string()))?;
        let server_id = provider_id.server_id().as_str();

        let api = self.client(&req.secret).await?;

        let server = api
            .find_server(provider_id.datacenter_id().as_str(), server_id)
            .await
            .map_err(|e| DriverError::not_found(e.to_string()))?;
        if server.state().is_inactive() {
            return Err(DriverError::not_found(format!(
                "VM {} ({server_id}) does not exist",
                server.name()
            )));
        }

        Ok(GetMachineStatusResponse {
            provider_id: machine.provider_id.clone(),
            node_name: server.name().to_string(),
        })
    }

    /// List the machines owned by a machine class's cluster and zone.
    pub async fn list_machines(
        &self,
        _ctx: &RequestContext,
        req: &ListMachinesRequest,
    ) -> Result<ListMachinesResponse, DriverError> {
        let spec = ProviderSpec::decode(&req.machine_class.provider_spec)
            .map_err(|e| DriverError::invalid_argument(e.to_string()))?;
        info!(machine_class = %req.machine_class.name, "List machines request has been received");

        let api = self.client(&req.secret).await?;
        let datacenter_id = spec.datacenter_id.as_str();

        let servers = api
            .list_servers(datacenter_id)
            .await
            .map_err(|e| DriverError::unavailable(e.to_string()))?;

        let selector = OwnershipSelector::new(&spec.cluster, &spec.zone);
        let mut response = ListMachinesResponse::default();

        for server in servers {
            if server.state().is_inactive() {
                continue;
            }

            let labels = api
                .list_server_labels(datacenter_id, &server.id)
                .await
                .map_err(|e| DriverError::unavailable(e.to_string()))?;

            if selector.owns(&labels) {
                response.machine_list.insert(
                    ProviderId::encode(datacenter_id, &server.id),
                    server.name().to_string(),
                );
            }
        }

        info!(
            machine_class = %req.machine_class.name,
            count = response.machine_list.len(),
            "List machines request has been processed"
        );
        Ok(response)
    }

    /// Not supported.
    pub async fn get_volume_ids(
        &self,
        _ctx: &RequestContext,
        req: &GetVolumeIdsRequest,
    ) -> Result<GetVolumeIdsResponse, DriverError> {
        debug!(pv_specs = req.pv_specs.len(), "GetVolumeIDs request has been received");
        Err(DriverError::unimplemented("GetVolumeIDs"))
    }

    /// Not supported.
    pub async fn generate_machine_class_for_migration(
        &self,
        _ctx: &RequestContext,
        _req: &GenerateMachineClassForMigrationRequest,
    ) -> Result<GenerateMachineClassForMigrationResponse, DriverError> {
        debug!("MigrateMachineClass request has been received");
        Err(DriverError::unimplemented("GenerateMachineClassForMigration"))
    }
}

fn ignore_not_found(result: Result<(), ApiError>) -> Result<(), ApiError> {
    result.optional().map(|_| ())
}

async fn wait_for_server(
    api: &dyn CloudApi,
    poll: &PollConfig,
    ctx: &RequestContext,
    datacenter_id: &str,
    server_id: &str,
) -> Result<Option<Server>, DriverError> {
    let server = wait_until_settled(ctx, poll, "server", move || async move {
        api.find_server(datacenter_id, server_id).await.optional()
    })
    .await?;
    Ok(server)
}

async fn wait_for_volume(
    api: &dyn CloudApi,
    poll: &PollConfig,
    ctx: &RequestContext,
    datacenter_id: &str,
    volume_id: &str,
) -> Result<Option<Volume>, DriverError> {
    let volume = wait_until_settled(ctx, poll, "volume", move || async move {
        api.find_volume(datacenter_id, volume_id).await.optional()
    })
    .await?;
    Ok(volume)
}

/// The steps of one machine creation.
struct Provisioning<'a> {
    api: &'a dyn CloudApi,
    poll: &'a PollConfig,
    ctx: &'a RequestContext,
    spec: &'a ProviderSpec,
    machine_name: &'a str,
}

impl Provisioning<'_> {
    fn datacenter_id(&self) -> &str {
        &self.spec.datacenter_id
    }

    async fn run(
        &self,
        image: &Image,
        user_data: &[u8],
        ledger: &mut ProvisioningLedger,
    ) -> Result<CreateMachineResponse, DriverError> {
        let volume_id = self.create_volume(image, user_data, ledger).await?;
        let server_id = self.create_server(&volume_id, ledger).await?;

        self.label_server(&server_id).await?;
        self.attach_networks(&server_id).await?;

        wait_for_server(self.api, self.poll, self.ctx, self.datacenter_id(), &server_id).await?;
        self.api
            .start_server(self.datacenter_id(), &server_id)
            .await
            .map_err(|e| DriverError::aborted(e.to_string()))?;

        let server =
            wait_for_server(self.api, self.poll, self.ctx, self.datacenter_id(), &server_id)
                .await?
                .ok_or_else(|| {
                    DriverError::internal(format!("server {server_id} vanished while starting"))
                })?;

        Ok(CreateMachineResponse {
            provider_id: ProviderId::encode(self.datacenter_id(), &server.id),
            node_name: server.name().to_string(),
        })
    }

    async fn create_volume(
        &self,
        image: &Image,
        user_data: &[u8],
        ledger: &mut ProvisioningLedger,
    ) -> Result<String, DriverError> {
        let properties = VolumeProperties {
            name: Some(self.machine_name.to_string()),
            volume_type: Some(VOLUME_TYPE.to_string()),
            size: Some(self.spec.volume_size_gb(image.properties.size)),
            image: Some(self.spec.image_id.clone()),
            ssh_keys: Some(vec![format!("{}\n", self.spec.ssh_key)]),
            user_data: Some(BASE64_STANDARD.encode(user_data)),
        };

        let volume = self
            .api
            .create_volume(self.datacenter_id(), &properties)
            .await
            .map_err(DriverError::from_create)?;
        ledger.record_volume(&volume.id);
        debug!(volume_id = %volume.id, "Volume creation accepted");

        wait_for_volume(self.api, self.poll, self.ctx, self.datacenter_id(), &volume.id).await?;

        for (key, value) in labels::volume_labels(&self.spec.cluster) {
            self.api
                .add_volume_label(self.datacenter_id(), &volume.id, key, &value)
                .await
                .map_err(|e| DriverError::internal(e.to_string()))?;
        }

        Ok(volume.id)
    }

    async fn create_server(
        &self,
        volume_id: &str,
        ledger: &mut ProvisioningLedger,
    ) -> Result<String, DriverError> {
        let body = ServerCreate {
            properties: ServerProperties {
                name: Some(self.machine_name.to_string()),
                cores: Some(to_api_int(self.spec.cores)),
                ram: Some(to_api_int(self.spec.memory)),
                boot_volume: Some(ResourceReference::new(volume_id)),
                ..Default::default()
            },
            entities: ServerCreateEntities {
                volumes: Collection::new(vec![ResourceReference::new(volume_id)]),
            },
        };

        let server = self
            .api
            .create_server(self.datacenter_id(), &body)
            .await
            .map_err(DriverError::from_create)?;
        ledger.record_server(&server.id);
        debug!(server_id = %server.id, "Server creation accepted");

        wait_for_server(self.api, self.poll, self.ctx, self.datacenter_id(), &server.id).await?;
        self.api
            .stop_server(self.datacenter_id(), &server.id)
            .await
            .map_err(|e| DriverError::aborted(e.to_string()))?;
        wait_for_server(self.api, self.poll, self.ctx, self.datacenter_id(), &server.id).await?;

        Ok(server.id)
    }

    async fn label_server(&self, server_id: &str) -> Result<(), DriverError> {
        let labels = labels::server_labels(&self.spec.cluster, self.spec.region(), &self.spec.zone);
        for (key, value) in labels {
            self.api
                .add_server_label(self.datacenter_id(), server_id, key, &value)
                .await
                .map_err(|e| DriverError::internal(e.to_string()))?;
        }
        Ok(())
    }

    async fn attach_networks(&self, server_id: &str) -> Result<(), DriverError> {
        let attacher = NetworkAttacher::new(self.api, self.poll, self.ctx);
        let datacenter_id = self.datacenter_id();
        let wan = self
            .spec
            .wan_network_id()
            .ok_or_else(|| DriverError::invalid_argument("networkIDs.wan is a required field"))?;

        let wan_config = NicConfig::wan();
        match self.spec.floating_pool_id() {
            Some(pool_id) => {
                attacher
                    .attach_with_floating_ip(datacenter_id, server_id, wan, pool_id, &wan_config)
                    .await?
            }
            None => {
                attacher
                    .attach(datacenter_id, server_id, wan, &wan_config)
                    .await?
            }
        };

        if let Some(workers) = self.spec.workers_network_id() {
            attacher
                .attach(datacenter_id, server_id, workers, &NicConfig::without_dhcp())
                .await?;
        }

        Ok(())
    }

    /// Best-effort removal of everything in `ledger`.
    async fn rollback(&self, ledger: &ProvisioningLedger) {
        if ledger.is_empty() {
            debug!(machine = self.machine_name, "Nothing to roll back");
            return;
        }

        let datacenter_id = self.datacenter_id();

        if let Some(server_id) = ledger.server_id() {
            match self.api.stop_server(datacenter_id, server_id).await {
                Ok(()) => {
                    let settled =
                        wait_for_server(self.api, self.poll, self.ctx, datacenter_id, server_id);
                    if let Err(err) = settled.await {
                        warn!(server_id, error = %err, "Rollback: waiting for server stop failed");
                    }
                }
                Err(err) => warn!(server_id, error = %err, "Rollback: stopping server failed"),
            }
        }

        if let Some(volume_id) = ledger.volume_id() {
            if let Err(err) = self.api.delete_volume(datacenter_id, volume_id).await {
                warn!(volume_id, error = %err, "Rollback: deleting volume failed");
            }
        }

        if let Some(server_id) = ledger.server_id() {
            if let Err(err) = self.api.delete_server(datacenter_id, server_id).await {
                warn!(server_id, error = %err, "Rollback: deleting server failed");
            }
        }
    }
}

/// Sizes are validated non-zero; values beyond the API's range saturate.
fn to_api_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
