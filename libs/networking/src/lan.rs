//! Public LANs carrying a floating IP.

use ionos_mcm_cloud::{IpFailover, LanProperties};
use tracing::{debug, info};

use crate::attach::{select_floating_ip, NetworkAttacher};
use crate::AttachError;

impl NetworkAttacher<'_> {
    /// Creates a public LAN named `lan_name` that fails over to a free
    /// address of the floating pool.
    ///
    /// Returns the ID of the new LAN.
    pub async fn ensure_floating_lan(
        &self,
        datacenter_id: &str,
        floating_pool_id: &str,
        lan_name: &str,
    ) -> Result<String, AttachError> {
        let block = self.api().find_ip_block(floating_pool_id).await?;
        let ip = select_floating_ip(&block).ok_or_else(|| AttachError::PoolExhausted {
            pool_id: floating_pool_id.to_string(),
        })?;

        let properties = LanProperties {
            name: Some(lan_name.to_string()),
            public: Some(true),
            ip_failover: Some(vec![IpFailover {
                ip: ip.to_string(),
                nic_uuid: None,
            }]),
        };

        debug!(datacenter_id, lan_name, ip, "Creating floating IP LAN");
        let lan = self.api().create_lan(datacenter_id, &properties).await?;
        info!(datacenter_id, lan_id = %lan.id, lan_name, "Floating IP LAN created");

        Ok(lan.id)
    }

    /// Deletes every LAN named `lan_name`.
    ///
    /// Returns the number of LANs deleted.
    pub async fn remove_lans_named(
        &self,
        datacenter_id: &str,
        lan_name: &str,
    ) -> Result<usize, AttachError> {
        let mut removed = 0;
        for lan in self.api().list_lans(datacenter_id).await? {
            if lan.properties.name.as_deref() != Some(lan_name) {
                continue;
            }

            self.api().delete_lan(datacenter_id, &lan.id).await?;
            debug!(datacenter_id, lan_id = %lan.id, "LAN deleted");
            removed += 1;
        }

        Ok(removed)
    }
}
