//! Wire models of the IONOS Cloud API (v5).
//!
//! Only the fields the provider reads or writes are modelled. Metadata is
//! read-only and never serialized back.

use ionos_mcm_reconcile::{ResourceState, Settling};
use serde::{Deserialize, Serialize};

/// Server-maintained resource metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub state: ResourceState,
}

/// A paged collection wrapper (`{"items": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

// Empty collections must exist for item types without a default.
impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Reference to another resource by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub id: String,
}

impl ResourceReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

macro_rules! impl_settling {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Settling for $ty {
                fn state(&self) -> &ResourceState {
                    &self.metadata.state
                }
            }
        )+
    };
}

// =============================================================================
// Images
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub properties: ImageProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    #[serde(default)]
    pub name: Option<String>,
    /// Image size in GB.
    #[serde(default)]
    pub size: f32,
    #[serde(default)]
    pub cloud_init: Option<String>,
}

impl Image {
    /// Whether first-boot user data can be injected into volumes built from this image.
    pub fn supports_cloud_init(&self) -> bool {
        matches!(self.properties.cloud_init.as_deref(), Some(mode) if mode != "NONE")
    }
}

// =============================================================================
// Volumes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub properties: VolumeProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

// =============================================================================
// Servers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub properties: ServerProperties,
    #[serde(default)]
    pub entities: Option<ServerEntities>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<i32>,
    /// Memory in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_volume: Option<ResourceReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerEntities {
    #[serde(default)]
    pub volumes: Option<Collection<Volume>>,
}

impl Server {
    /// The server's reported name, empty if the API omitted it.
    pub fn name(&self) -> &str {
        self.properties.name.as_deref().unwrap_or_default()
    }

    /// IDs of the volumes attached to this server.
    ///
    /// Only populated when the server was fetched with enough depth.
    pub fn attached_volume_ids(&self) -> Vec<&str> {
        self.entities
            .as_ref()
            .and_then(|e| e.volumes.as_ref())
            .map(|v| v.items.iter().map(|volume| volume.id.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Request body for creating a server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerCreate {
    pub properties: ServerProperties,
    pub entities: ServerCreateEntities,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerCreateEntities {
    pub volumes: Collection<ResourceReference>,
}

// =============================================================================
// Network interfaces
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Nic {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub properties: NicProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<bool>,
    #[serde(default)]
    pub lan: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_active: Option<bool>,
}

// =============================================================================
// Labels
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: LabelProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelProperties {
    pub key: String,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            properties: LabelProperties {
                key: key.into(),
                value: value.into(),
            },
        }
    }

    pub fn key(&self) -> &str {
        &self.properties.key
    }

    pub fn value(&self) -> &str {
        &self.properties.value
    }
}

// =============================================================================
// IP blocks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpBlock {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub properties: IpBlockProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpBlockProperties {
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub ip_consumers: Vec<IpConsumer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConsumer {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub nic_id: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
}

// =============================================================================
// LANs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lan {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub properties: LanProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_failover: Option<Vec<IpFailover>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpFailover {
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_uuid: Option<String>,
}

impl_settling!(Image, Volume, Server, Nic, IpBlock, Lan);
