//! Shared fixtures for driver tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ionos_mcm_cloud::ClientRegistry;
use ionos_mcm_provider::{
    CreateMachineRequest, DeleteMachineRequest, GetMachineStatusRequest, ListMachinesRequest,
    Machine, MachineClass, MachineDriver, Secret, PASSWORD_KEY, USER_DATA_KEY, USER_KEY,
};
use ionos_mcm_reconcile::PollConfig;
use ionos_mcm_testing::FakeCloud;
use serde_json::json;

pub const DC: &str = "12345678-9abc-4def-8123-456789abcdef";
pub const IMAGE: &str = "15f67991-0f51-4efc-a8ad-ef1fb31a480c";
pub const USER: &str = "user@example.com";
pub const CLUSTER: &str = "shoot--core--test";
pub const ZONE: &str = "de-fra";
pub const USER_DATA: &[u8] = b"#cloud-config\nruncmd: []\n";

/// A cloud with one cloud-init capable image of 10 GB.
pub fn cloud() -> FakeCloud {
    FakeCloud::new().with_image(IMAGE, 10.0, Some("V1"))
}

pub fn poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_secs(5),
        max_retries: 3,
    }
}

pub async fn driver(cloud: &Arc<FakeCloud>) -> MachineDriver {
    let registry = ClientRegistry::new("http://127.0.0.1:1", Duration::from_secs(1));
    registry.set(USER, cloud.clone()).await;
    MachineDriver::new(Arc::new(registry), poll())
}

pub fn spec() -> serde_json::Value {
    json!({
        "datacenterID": DC,
        "cluster": CLUSTER,
        "zone": ZONE,
        "cores": 1,
        "memory": 1024,
        "imageID": IMAGE,
        "sshKey": "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5",
        "networkIDs": {"wan": "1"}
    })
}

pub fn machine_class(spec: serde_json::Value) -> MachineClass {
    MachineClass {
        name: "worker-class".to_string(),
        provider_spec: spec,
    }
}

pub fn secret() -> Secret {
    Secret::new()
        .with(USER_KEY, USER)
        .with(PASSWORD_KEY, "secret")
        .with(USER_DATA_KEY, USER_DATA.to_vec())
}

pub fn create_request(spec: serde_json::Value) -> CreateMachineRequest {
    CreateMachineRequest {
        machine: Machine::new("machine-1"),
        machine_class: machine_class(spec),
        secret: secret(),
    }
}

pub fn delete_request(provider_id: &str) -> DeleteMachineRequest {
    DeleteMachineRequest {
        machine: Machine::new("machine-1").with_provider_id(provider_id),
        secret: secret(),
    }
}

pub fn status_request(provider_id: &str) -> GetMachineStatusRequest {
    GetMachineStatusRequest {
        machine: Machine::new("machine-1").with_provider_id(provider_id),
        secret: secret(),
    }
}

pub fn list_request() -> ListMachinesRequest {
    ListMachinesRequest {
        machine_class: machine_class(spec()),
        secret: secret(),
    }
}
