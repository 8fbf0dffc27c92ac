//! In-memory cloud backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ionos_mcm_cloud::{
    ApiError, CloudApi, Collection, Image, ImageProperties, IpBlock, IpBlockProperties,
    IpConsumer, Label, Lan, LanProperties, Metadata, Nic, NicProperties, Server, ServerCreate,
    ServerEntities, ServerProperties, Volume, VolumeProperties,
};
use ionos_mcm_reconcile::ResourceState;
use uuid::Uuid;

/// Cloud operations, used to inject failures and inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FindImage,
    CreateVolume,
    FindVolume,
    DeleteVolume,
    AddVolumeLabel,
    CreateServer,
    FindServer,
    ListServers,
    DeleteServer,
    StartServer,
    StopServer,
    AddServerLabel,
    ListServerLabels,
    CreateNic,
    FindNic,
    FindIpBlock,
    CreateLan,
    ListLans,
    DeleteLan,
}

/// A recorded call: the operation and the ID it addressed.
///
/// Creates and listings address their parent (datacenter or server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub target: String,
}

struct FakeServer {
    datacenter_id: String,
    server: Server,
    labels: Vec<Label>,
    nics: Vec<Nic>,
}

#[derive(Default)]
struct State {
    images: HashMap<String, Image>,
    ip_blocks: HashMap<String, IpBlock>,
    volumes: HashMap<String, Volume>,
    volume_labels: HashMap<String, Vec<Label>>,
    servers: Vec<FakeServer>,
    lans: Vec<(String, Lan)>,
    next_lan: i32,
    created_volumes: Vec<VolumeProperties>,
    created_servers: Vec<ServerCreate>,
    calls: Vec<Call>,
    failures: HashMap<Op, ApiError>,
    busy: HashMap<Op, u32>,
}

impl State {
    /// Records the call and returns the injected failure for `op`, if any.
    fn enter(&mut self, op: Op, target: &str) -> Result<(), ApiError> {
        self.calls.push(Call {
            op,
            target: target.to_string(),
        });
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Consumes one scripted busy response for `op`.
    fn take_busy(&mut self, op: Op) -> bool {
        match self.busy.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    fn server_mut(
        &mut self,
        datacenter_id: &str,
        server_id: &str,
    ) -> Result<&mut FakeServer, ApiError> {
        self.servers
            .iter_mut()
            .find(|s| s.datacenter_id == datacenter_id && s.server.id == server_id)
            .ok_or_else(|| not_found("server", server_id))
    }

    fn server(&self, server_id: &str) -> Option<&FakeServer> {
        self.servers.iter().find(|s| s.server.id == server_id)
    }
}

fn not_found(kind: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("{kind} {id}"))
}

fn available() -> Metadata {
    Metadata {
        state: ResourceState::Available,
    }
}

fn busy() -> Metadata {
    Metadata {
        state: ResourceState::Busy,
    }
}

/// In-memory [`CloudApi`] with call recording and fault injection.
#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Seeding
    // -------------------------------------------------------------------------

    /// Adds an image of `size_gb` with the given cloud-init mode.
    pub fn with_image(self, image_id: &str, size_gb: f32, cloud_init: Option<&str>) -> Self {
        self.lock().images.insert(
            image_id.to_string(),
            Image {
                id: image_id.to_string(),
                metadata: available(),
                properties: ImageProperties {
                    name: Some(image_id.to_string()),
                    size: size_gb,
                    cloud_init: cloud_init.map(str::to_string),
                },
            },
        );
        self
    }

    /// Adds an IP block whose `consumed` addresses are in use.
    pub fn with_ip_block(self, ip_block_id: &str, ips: &[&str], consumed: &[&str]) -> Self {
        self.lock().ip_blocks.insert(
            ip_block_id.to_string(),
            IpBlock {
                id: ip_block_id.to_string(),
                metadata: available(),
                properties: IpBlockProperties {
                    ips: ips.iter().map(|ip| ip.to_string()).collect(),
                    ip_consumers: consumed
                        .iter()
                        .map(|ip| IpConsumer {
                            ip: Some(ip.to_string()),
                            ..Default::default()
                        })
                        .collect(),
                },
            },
        );
        self
    }

    /// Adds a running server carrying `labels`.
    pub fn with_server(
        self,
        datacenter_id: &str,
        server_id: &str,
        name: &str,
        labels: &[(&str, &str)],
    ) -> Self {
        self.lock().servers.push(FakeServer {
            datacenter_id: datacenter_id.to_string(),
            server: Server {
                id: server_id.to_string(),
                metadata: available(),
                properties: ServerProperties {
                    name: Some(name.to_string()),
                    vm_state: Some("RUNNING".to_string()),
                    ..Default::default()
                },
                entities: Some(ServerEntities {
                    volumes: Some(Collection::default()),
                }),
            },
            labels: labels.iter().map(|(k, v)| Label::new(*k, *v)).collect(),
            nics: Vec::new(),
        });
        self
    }

    /// Overrides the reported state of a seeded server.
    pub fn with_server_state(self, server_id: &str, state: &str) -> Self {
        if let Some(s) = self
            .lock()
            .servers
            .iter_mut()
            .find(|s| s.server.id == server_id)
        {
            s.server.metadata.state = ResourceState::parse(state);
        }
        self
    }

    /// Adds a volume attached to a seeded server.
    pub fn with_attached_volume(self, server_id: &str, volume_id: &str) -> Self {
        {
            let mut state = self.lock();
            let volume = Volume {
                id: volume_id.to_string(),
                metadata: available(),
                properties: VolumeProperties::default(),
            };
            state.volumes.insert(volume_id.to_string(), volume.clone());
            if let Some(s) = state.servers.iter_mut().find(|s| s.server.id == server_id) {
                s.server
                    .entities
                    .get_or_insert_with(ServerEntities::default)
                    .volumes
                    .get_or_insert_with(Collection::default)
                    .items
                    .push(volume);
            }
        }
        self
    }

    /// Adds a LAN to `datacenter_id`.
    pub fn with_lan(self, datacenter_id: &str, lan_id: &str, name: &str) -> Self {
        self.lock().lans.push((
            datacenter_id.to_string(),
            Lan {
                id: lan_id.to_string(),
                metadata: available(),
                properties: LanProperties {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
            },
        ));
        self
    }

    // -------------------------------------------------------------------------
    // Behaviour
    // -------------------------------------------------------------------------

    /// Makes every call of `op` fail with `err`.
    pub fn failing(self, op: Op, err: ApiError) -> Self {
        self.fail(op, err);
        self
    }

    /// Makes every subsequent call of `op` fail with `err`.
    pub fn fail(&self, op: Op, err: ApiError) {
        self.lock().failures.insert(op, err);
    }

    /// Lets the first `polls` lookups of `op` report the resource as busy.
    pub fn busy_for(self, op: Op, polls: u32) -> Self {
        self.lock().busy.insert(op, polls);
        self
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of calls made to `op`.
    pub fn count(&self, op: Op) -> usize {
        self.lock().calls.iter().filter(|c| c.op == op).count()
    }

    /// IDs addressed by calls to `op`, in call order.
    pub fn targets(&self, op: Op) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.target.clone())
            .collect()
    }

    /// Properties of every volume creation request.
    pub fn created_volumes(&self) -> Vec<VolumeProperties> {
        self.lock().created_volumes.clone()
    }

    /// Every server creation request.
    pub fn created_servers(&self) -> Vec<ServerCreate> {
        self.lock().created_servers.clone()
    }

    pub fn server(&self, server_id: &str) -> Option<Server> {
        self.lock().server(server_id).map(|s| s.server.clone())
    }

    pub fn server_ids(&self) -> Vec<String> {
        self.lock().servers.iter().map(|s| s.server.id.clone()).collect()
    }

    pub fn volume_ids(&self) -> Vec<String> {
        self.lock().volumes.keys().cloned().collect()
    }

    /// Labels of a server as `(key, value)` pairs.
    pub fn server_labels(&self, server_id: &str) -> Vec<(String, String)> {
        self.lock()
            .server(server_id)
            .map(|s| {
                s.labels
                    .iter()
                    .map(|l| (l.key().to_string(), l.value().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Labels of a volume as `(key, value)` pairs.
    pub fn volume_labels(&self, volume_id: &str) -> Vec<(String, String)> {
        self.lock()
            .volume_labels
            .get(volume_id)
            .map(|labels| {
                labels
                    .iter()
                    .map(|l| (l.key().to_string(), l.value().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Properties of the NICs attached to a server, in creation order.
    pub fn nics(&self, server_id: &str) -> Vec<NicProperties> {
        self.lock()
            .server(server_id)
            .map(|s| s.nics.iter().map(|n| n.properties.clone()).collect())
            .unwrap_or_default()
    }

    pub fn lans(&self, datacenter_id: &str) -> Vec<Lan> {
        self.lock()
            .lans
            .iter()
            .filter(|(dc, _)| dc == datacenter_id)
            .map(|(_, lan)| lan.clone())
            .collect()
    }
}

#[async_trait]
impl CloudApi for FakeCloud {
    async fn find_image(&self, image_id: &str) -> Result<Image, ApiError> {
        let mut state = self.lock();
        state.enter(Op::FindImage, image_id)?;
        state
            .images
            .get(image_id)
            .cloned()
            .ok_or_else(|| not_found("image", image_id))
    }

    async fn create_volume(
        &self,
        datacenter_id: &str,
        properties: &VolumeProperties,
    ) -> Result<Volume, ApiError> {
        let mut state = self.lock();
        state.enter(Op::CreateVolume, datacenter_id)?;
        state.created_volumes.push(properties.clone());

        let volume = Volume {
            id: Uuid::new_v4().to_string(),
            metadata: available(),
            properties: properties.clone(),
        };
        state.volumes.insert(volume.id.clone(), volume.clone());

        Ok(Volume {
            metadata: busy(),
            ..volume
        })
    }

    async fn find_volume(&self, _datacenter_id: &str, volume_id: &str) -> Result<Volume, ApiError> {
        let mut state = self.lock();
        state.enter(Op::FindVolume, volume_id)?;
        let mut volume = state
            .volumes
            .get(volume_id)
            .cloned()
            .ok_or_else(|| not_found("volume", volume_id))?;
        if state.take_busy(Op::FindVolume) {
            volume.metadata = busy();
        }
        Ok(volume)
    }

    async fn delete_volume(&self, _datacenter_id: &str, volume_id: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.enter(Op::DeleteVolume, volume_id)?;
        state
            .volumes
            .remove(volume_id)
            .ok_or_else(|| not_found("volume", volume_id))?;
        for s in &mut state.servers {
            if let Some(volumes) = s.server.entities.as_mut().and_then(|e| e.volumes.as_mut()) {
                volumes.items.retain(|v| v.id != volume_id);
            }
        }
        Ok(())
    }

    async fn add_volume_label(
        &self,
        _datacenter_id: &str,
        volume_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Label, ApiError> {
        let mut state = self.lock();
        state.enter(Op::AddVolumeLabel, volume_id)?;
        if !state.volumes.contains_key(volume_id) {
            return Err(not_found("volume", volume_id));
        }
        let label = Label::new(key, value);
        state
            .volume_labels
            .entry(volume_id.to_string())
            .or_default()
            .push(label.clone());
        Ok(label)
    }

    async fn create_server(
        &self,
        datacenter_id: &str,
        server: &ServerCreate,
    ) -> Result<Server, ApiError> {
        let mut state = self.lock();
        state.enter(Op::CreateServer, datacenter_id)?;
        state.created_servers.push(server.clone());

        let volumes = server
            .entities
            .volumes
            .items
            .iter()
            .filter_map(|r| state.volumes.get(&r.id).cloned())
            .collect();
        let created = Server {
            id: Uuid::new_v4().to_string(),
            metadata: available(),
            properties: ServerProperties {
                vm_state: Some("RUNNING".to_string()),
                ..server.properties.clone()
            },
            entities: Some(ServerEntities {
                volumes: Some(Collection::new(volumes)),
            }),
        };
        state.servers.push(FakeServer {
            datacenter_id: datacenter_id.to_string(),
            server: created.clone(),
            labels: Vec::new(),
            nics: Vec::new(),
        });

        Ok(Server {
            metadata: busy(),
            ..created
        })
    }

    async fn find_server(&self, datacenter_id: &str, server_id: &str) -> Result<Server, ApiError> {
        let mut state = self.lock();
        state.enter(Op::FindServer, server_id)?;
        let mut server = state.server_mut(datacenter_id, server_id)?.server.clone();
        if state.take_busy(Op::FindServer) {
            server.metadata = busy();
        }
        Ok(server)
    }

    async fn list_servers(&self, datacenter_id: &str) -> Result<Vec<Server>, ApiError> {
        let mut state = self.lock();
        state.enter(Op::ListServers, datacenter_id)?;
        Ok(state
            .servers
            .iter()
            .filter(|s| s.datacenter_id == datacenter_id)
            .map(|s| s.server.clone())
            .collect())
    }

    async fn delete_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.enter(Op::DeleteServer, server_id)?;
        state.server_mut(datacenter_id, server_id)?;
        state.servers.retain(|s| s.server.id != server_id);
        Ok(())
    }

    async fn start_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.enter(Op::StartServer, server_id)?;
        state.server_mut(datacenter_id, server_id)?.server.properties.vm_state =
            Some("RUNNING".to_string());
        Ok(())
    }

    async fn stop_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.enter(Op::StopServer, server_id)?;
        state.server_mut(datacenter_id, server_id)?.server.properties.vm_state =
            Some("SHUTOFF".to_string());
        Ok(())
    }

    async fn add_server_label(
        &self,
        datacenter_id: &str,
        server_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Label, ApiError> {
        let mut state = self.lock();
        state.enter(Op::AddServerLabel, server_id)?;
        let label = Label::new(key, value);
        state
            .server_mut(datacenter_id, server_id)?
            .labels
            .push(label.clone());
        Ok(label)
    }

    async fn list_server_labels(
        &self,
        datacenter_id: &str,
        server_id: &str,
    ) -> Result<Vec<Label>, ApiError> {
        let mut state = self.lock();
        state.enter(Op::ListServerLabels, server_id)?;
        Ok(state.server_mut(datacenter_id, server_id)?.labels.clone())
    }

    async fn create_nic(
        &self,
        datacenter_id: &str,
        server_id: &str,
        properties: &NicProperties,
    ) -> Result<Nic, ApiError> {
        let mut state = self.lock();
        state.enter(Op::CreateNic, server_id)?;
        let nic = Nic {
            id: Uuid::new_v4().to_string(),
            metadata: available(),
            properties: properties.clone(),
        };
        state
            .server_mut(datacenter_id, server_id)?
            .nics
            .push(nic.clone());
        Ok(Nic {
            metadata: busy(),
            ..nic
        })
    }

    async fn find_nic(
        &self,
        datacenter_id: &str,
        server_id: &str,
        nic_id: &str,
    ) -> Result<Nic, ApiError> {
        let mut state = self.lock();
        state.enter(Op::FindNic, nic_id)?;
        let mut nic = state
            .server_mut(datacenter_id, server_id)?
            .nics
            .iter()
            .find(|n| n.id == nic_id)
            .cloned()
            .ok_or_else(|| not_found("NIC", nic_id))?;
        if state.take_busy(Op::FindNic) {
            nic.metadata = busy();
        }
        Ok(nic)
    }

    async fn find_ip_block(&self, ip_block_id: &str) -> Result<IpBlock, ApiError> {
        let mut state = self.lock();
        state.enter(Op::FindIpBlock, ip_block_id)?;
        state
            .ip_blocks
            .get(ip_block_id)
            .cloned()
            .ok_or_else(|| not_found("IP block", ip_block_id))
    }

    async fn create_lan(
        &self,
        datacenter_id: &str,
        properties: &LanProperties,
    ) -> Result<Lan, ApiError> {
        let mut state = self.lock();
        state.enter(Op::CreateLan, datacenter_id)?;
        state.next_lan += 1;
        let lan = Lan {
            id: format!("{}", 100 + state.next_lan),
            metadata: available(),
            properties: properties.clone(),
        };
        state.lans.push((datacenter_id.to_string(), lan.clone()));
        Ok(lan)
    }

    async fn list_lans(&self, datacenter_id: &str) -> Result<Vec<Lan>, ApiError> {
        let mut state = self.lock();
        state.enter(Op::ListLans, datacenter_id)?;
        Ok(state
            .lans
            .iter()
            .filter(|(dc, _)| dc == datacenter_id)
            .map(|(_, lan)| lan.clone())
            .collect())
    }

    async fn delete_lan(&self, datacenter_id: &str, lan_id: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.enter(Op::DeleteLan, lan_id)?;
        let before = state.lans.len();
        state
            .lans
            .retain(|(dc, lan)| !(dc == datacenter_id && lan.id == lan_id));
        if state.lans.len() == before {
            return Err(not_found("LAN", lan_id));
        }
        Ok(())
    }
}
