//! # ionos-mcm-id
//!
//! Provider IDs and typed resource identifiers for IONOS-backed machines.
//!
//! ## Provider ID Format
//!
//! The orchestrator refers to a machine through an opaque provider ID of
//! the form `ionos:///{datacenter_id}/{server_id}`, where both components
//! are UUID-formatted identifiers issued by the cloud API.
//!
//! Example:
//! - `ionos:///01234567-89ab-4def-0123-c56789abcdef/6789abcd-ef01-4345-6789-abcdef012325`
//!
//! Encoding is a plain concatenation and decoding validates every part, so
//! `ProviderId::parse(&ProviderId::encode(d, s))` always yields `(d, s)`
//! for valid inputs.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for the ID macro and for consumers generating fixtures.
pub use uuid::Uuid;
