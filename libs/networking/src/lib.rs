//! Network attachment for provisioned servers.
//!
//! This library provides:
//! - NIC configuration presets for WAN, worker-subnet and floating-IP interfaces
//! - Attaching a NIC to a server and waiting until it has settled
//! - Floating IP selection from a shared IP block
//! - Public LANs carrying a floating IP as failover address

use ionos_mcm_cloud::ApiError;
use ionos_mcm_reconcile::WaitError;
use thiserror::Error;

mod attach;
mod config;
mod lan;

pub use attach::{select_floating_ip, NetworkAttacher};
pub use config::NicConfig;

/// Network attachment errors.
#[derive(Debug, Error)]
pub enum AttachError {
    /// The network ID is not a numeric LAN ID.
    #[error("network ID '{0}' is not a valid LAN ID")]
    InvalidNetworkId(String),

    /// Every address of the floating pool is in use.
    #[error("floating pool IP block '{pool_id}' given is exhausted")]
    PoolExhausted { pool_id: String },

    /// A cloud API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Waiting for the interface to settle failed.
    #[error(transparent)]
    Wait(#[from] WaitError<ApiError>),
}

impl AttachError {
    /// Returns true if the caller's request was cancelled while waiting.
    pub fn is_canceled(&self) -> bool {
        matches!(self, AttachError::Wait(err) if err.is_canceled())
    }
}

/// Parses a network ID into the numeric LAN ID the API expects.
pub fn parse_lan_id(network_id: &str) -> Result<i32, AttachError> {
    network_id
        .trim()
        .parse()
        .map_err(|_| AttachError::InvalidNetworkId(network_id.to_string()))
}
