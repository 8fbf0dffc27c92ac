//! Attaching network interfaces to servers.

use ionos_mcm_cloud::{CloudApi, IpBlock, OptionalExt};
use ionos_mcm_reconcile::{wait_until_settled, PollConfig, RequestContext};
use tracing::{debug, info};

use crate::config::NicConfig;
use crate::{parse_lan_id, AttachError};

/// Picks an address of `block` that no consumer holds.
///
/// When several are free the last one in block order wins.
pub fn select_floating_ip(block: &IpBlock) -> Option<&str> {
    let consumed = |ip: &str| {
        block
            .properties
            .ip_consumers
            .iter()
            .any(|consumer| consumer.ip.as_deref() == Some(ip))
    };

    block
        .properties
        .ips
        .iter()
        .rev()
        .map(String::as_str)
        .find(|ip| !consumed(ip))
}

/// Attaches NICs within one request.
pub struct NetworkAttacher<'a> {
    api: &'a dyn CloudApi,
    poll: &'a PollConfig,
    ctx: &'a RequestContext,
}

impl<'a> NetworkAttacher<'a> {
    pub fn new(api: &'a dyn CloudApi, poll: &'a PollConfig, ctx: &'a RequestContext) -> Self {
        Self { api, poll, ctx }
    }

    pub(crate) fn api(&self) -> &'a dyn CloudApi {
        self.api
    }

    /// Creates a NIC on `network_id` and waits until it has settled.
    ///
    /// Returns the ID of the new NIC.
    pub async fn attach(
        &self,
        datacenter_id: &str,
        server_id: &str,
        network_id: &str,
        config: &NicConfig,
    ) -> Result<String, AttachError> {
        let lan = parse_lan_id(network_id)?;
        let properties = config.to_properties(lan);

        debug!(server_id, lan, dhcp = config.dhcp, firewall = config.firewall, "Creating NIC");
        let nic = self
            .api
            .create_nic(datacenter_id, server_id, &properties)
            .await?;

        let api = self.api;
        let nic_id = nic.id.as_str();
        wait_until_settled(self.ctx, self.poll, "NIC", move || async move {
            api.find_nic(datacenter_id, server_id, nic_id).await.optional()
        })
        .await?;

        info!(server_id, nic_id, lan, "NIC attached");
        Ok(nic.id)
    }

    /// Attaches a NIC bound to a free address of the floating pool.
    pub async fn attach_with_floating_ip(
        &self,
        datacenter_id: &str,
        server_id: &str,
        network_id: &str,
        floating_pool_id: &str,
        config: &NicConfig,
    ) -> Result<String, AttachError> {
        let block = self.api.find_ip_block(floating_pool_id).await?;
        let ip = select_floating_ip(&block).ok_or_else(|| AttachError::PoolExhausted {
            pool_id: floating_pool_id.to_string(),
        })?;

        debug!(server_id, floating_pool_id, ip, "Selected floating IP");
        let config = config.clone().with_ip(ip);
        self.attach(datacenter_id, server_id, network_id, &config)
            .await
    }
}
