//! The cloud operations the provider depends on.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{
    Image, IpBlock, Label, Lan, LanProperties, Nic, NicProperties, Server, ServerCreate, Volume,
    VolumeProperties,
};

/// Datacenter-scoped operations of the IONOS Cloud API.
///
/// Every lookup returns [`ApiError::NotFound`] when the addressed resource
/// or its parent datacenter does not exist.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn find_image(&self, image_id: &str) -> Result<Image, ApiError>;

    async fn create_volume(
        &self,
        datacenter_id: &str,
        properties: &VolumeProperties,
    ) -> Result<Volume, ApiError>;

    async fn find_volume(&self, datacenter_id: &str, volume_id: &str) -> Result<Volume, ApiError>;

    async fn delete_volume(&self, datacenter_id: &str, volume_id: &str) -> Result<(), ApiError>;

    async fn add_volume_label(
        &self,
        datacenter_id: &str,
        volume_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Label, ApiError>;

    async fn create_server(
        &self,
        datacenter_id: &str,
        server: &ServerCreate,
    ) -> Result<Server, ApiError>;

    /// Fetches a server including its attached volumes.
    async fn find_server(&self, datacenter_id: &str, server_id: &str) -> Result<Server, ApiError>;

    async fn list_servers(&self, datacenter_id: &str) -> Result<Vec<Server>, ApiError>;

    async fn delete_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError>;

    async fn start_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError>;

    async fn stop_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError>;

    async fn add_server_label(
        &self,
        datacenter_id: &str,
        server_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Label, ApiError>;

    async fn list_server_labels(
        &self,
        datacenter_id: &str,
        server_id: &str,
    ) -> Result<Vec<Label>, ApiError>;

    async fn create_nic(
        &self,
        datacenter_id: &str,
        server_id: &str,
        properties: &NicProperties,
    ) -> Result<Nic, ApiError>;

    async fn find_nic(
        &self,
        datacenter_id: &str,
        server_id: &str,
        nic_id: &str,
    ) -> Result<Nic, ApiError>;

    async fn find_ip_block(&self, ip_block_id: &str) -> Result<IpBlock, ApiError>;

    async fn create_lan(
        &self,
        datacenter_id: &str,
        properties: &LanProperties,
    ) -> Result<Lan, ApiError>;

    async fn list_lans(&self, datacenter_id: &str) -> Result<Vec<Lan>, ApiError>;

    async fn delete_lan(&self, datacenter_id: &str, lan_id: &str) -> Result<(), ApiError>;
}
