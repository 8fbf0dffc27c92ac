//! Request and response types of the driver operations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ionos_mcm_cloud::Credentials;
use serde::{Deserialize, Serialize};

/// Secret key holding the API user.
pub const USER_KEY: &str = "user";
/// Secret key holding the API password.
pub const PASSWORD_KEY: &str = "password";
/// Secret key holding the first-boot user data.
pub const USER_DATA_KEY: &str = "userData";

/// A machine as known to the orchestrating host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub name: String,
    /// Encoded identity, empty until the machine has been created.
    #[serde(default)]
    pub provider_id: String,
}

impl Machine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_id: String::new(),
        }
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }
}

/// Machine class holding the raw provider specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineClass {
    pub name: String,
    #[serde(default)]
    pub provider_spec: serde_json::Value,
}

/// Secret data handed to the driver.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret {
    pub data: HashMap<String, Vec<u8>>,
}

impl Secret {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    fn string(&self, key: &str) -> String {
        self.data
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default()
    }

    /// API credentials; absent keys yield empty strings.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.string(USER_KEY), self.string(PASSWORD_KEY))
    }

    pub fn user_data(&self) -> Option<&[u8]> {
        self.data.get(USER_DATA_KEY).map(Vec::as_slice)
    }
}

// Keys only; values never reach logs.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.data.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_map()
            .entries(keys.into_iter().map(|key| (key, "<redacted>")))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CreateMachineRequest {
    pub machine: Machine,
    pub machine_class: MachineClass,
    pub secret: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachineResponse {
    pub provider_id: String,
    pub node_name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteMachineRequest {
    pub machine: Machine,
    pub secret: Secret,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteMachineResponse {}

#[derive(Debug, Clone)]
pub struct GetMachineStatusRequest {
    pub machine: Machine,
    pub secret: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMachineStatusResponse {
    pub provider_id: String,
    pub node_name: String,
}

#[derive(Debug, Clone)]
pub struct ListMachinesRequest {
    pub machine_class: MachineClass,
    pub secret: Secret,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMachinesResponse {
    /// Encoded identity to node name.
    pub machine_list: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct GetVolumeIdsRequest {
    pub pv_specs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVolumeIdsResponse {
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateMachineClassForMigrationRequest {
    pub provider_spec_machine_class: serde_json::Value,
    pub class_spec: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateMachineClassForMigrationResponse {}
