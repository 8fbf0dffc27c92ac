//! Machine provider for IONOS Cloud.
//!
//! Implements the driver operations a cluster orchestrator uses to manage
//! worker machines:
//!
//! - **create_machine**: boot volume, server, labels, NICs, power on
//! - **delete_machine**: power off, delete attached volumes, delete server
//! - **get_machine_status** / **list_machines**: lookups by identity and by
//!   ownership labels
//!
//! Creation has no transactional support in the cloud API. Every resource
//! created is recorded in a [`ProvisioningLedger`] and removed again if a
//! later step fails.

pub mod config;
pub mod driver;
pub mod error;
pub mod labels;
pub mod ledger;
pub mod spec;
pub mod types;

pub use config::ProviderConfig;
pub use driver::MachineDriver;
pub use error::{Code, DriverError};
pub use ledger::ProvisioningLedger;
pub use spec::{region_from_zone, FieldError, NetworkIds, ProviderSpec, SpecError};
pub use types::*;
