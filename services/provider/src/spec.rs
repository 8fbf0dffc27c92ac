//! Provider specification carried by a machine class.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded provider specification of a machine class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    #[serde(rename = "datacenterID", default)]
    pub datacenter_id: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub cores: u32,
    /// Memory in MB.
    #[serde(default)]
    pub memory: u32,
    #[serde(rename = "imageID", default)]
    pub image_id: String,
    #[serde(rename = "sshKey", default)]
    pub ssh_key: String,
    #[serde(rename = "floatingPoolID", default, skip_serializing_if = "Option::is_none")]
    pub floating_pool_id: Option<String>,
    #[serde(rename = "networkIDs", default, skip_serializing_if = "Option::is_none")]
    pub network_ids: Option<NetworkIds>,
    /// Requested boot volume size in the host's storage unit.
    #[serde(rename = "volumeSize", default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<f64>,
}

/// Networks a machine is attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIds {
    #[serde(default)]
    pub wan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<String>,
}

/// A required field that is missing or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is a required field", self.field)
    }
}

/// Errors decoding a provider specification.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse JSON data provided as ProviderSpec: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("error while validating ProviderSpec: {}", join(.0))]
    Invalid(Vec<FieldError>),
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ProviderSpec {
    /// Decode and validate a provider specification.
    pub fn decode(raw: &serde_json::Value) -> Result<Self, SpecError> {
        let spec: ProviderSpec = serde_json::from_value(raw.clone())?;
        let errors = spec.validate();
        if !errors.is_empty() {
            return Err(SpecError::Invalid(errors));
        }
        Ok(spec)
    }

    /// Every missing required field, in a fixed order.
    pub fn validate(&self) -> Vec<FieldError> {
        let checks = [
            ("datacenterID", self.datacenter_id.is_empty()),
            ("cluster", self.cluster.is_empty()),
            ("zone", self.zone.is_empty()),
            ("cores", self.cores == 0),
            ("memory", self.memory == 0),
            ("imageID", self.image_id.is_empty()),
            ("sshKey", self.ssh_key.is_empty()),
            ("networkIDs.wan", self.wan_network_id().is_none()),
        ];

        checks
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(field, _)| FieldError { field })
            .collect()
    }

    /// The primary network, if set.
    pub fn wan_network_id(&self) -> Option<&str> {
        self.network_ids
            .as_ref()
            .map(|n| n.wan.as_str())
            .filter(|wan| !wan.is_empty())
    }

    /// The worker subnet, if set.
    pub fn workers_network_id(&self) -> Option<&str> {
        self.network_ids.as_ref().and_then(|n| non_empty(&n.workers))
    }

    pub fn floating_pool_id(&self) -> Option<&str> {
        non_empty(&self.floating_pool_id)
    }

    /// The region, i.e. the zone up to its first `-`.
    pub fn region(&self) -> &str {
        region_from_zone(&self.zone)
    }

    /// Boot volume size in GB for an image of `image_size` GB.
    ///
    /// A requested size is converted from the host's storage unit and never
    /// shrinks the volume below the image.
    pub fn volume_size_gb(&self, image_size: f32) -> f32 {
        match self.volume_size {
            Some(size) if size > 0.0 => {
                let requested = (size / 1_048_576.0).ceil();
                requested.max(f64::from(image_size)) as f32
            }
            _ => image_size,
        }
    }
}

/// Returns the region a zone belongs to.
pub fn region_from_zone(zone: &str) -> &str {
    zone.split_once('-').map_or(zone, |(region, _)| region)
}
