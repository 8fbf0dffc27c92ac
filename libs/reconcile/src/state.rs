//! Resource states as reported by the cloud API.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Externally reported status of a cloud resource.
///
/// Parsed from the raw `metadata.state` string at the API boundary.
/// Unrecognized values are kept verbatim and treated as settled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Resource is provisioned and usable.
    Available,

    /// A change to the resource is still being applied.
    Busy,

    /// Resource is switched off or no longer in use.
    Inactive,

    /// Any state not known to this crate.
    Unknown(String),
}

impl ResourceState {
    /// Parse a raw state string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "AVAILABLE" => Self::Available,
            "BUSY" => Self::Busy,
            "INACTIVE" => Self::Inactive,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns true while a change is pending.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Returns true if the resource is in the terminal inactive state.
    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Inactive)
    }

    /// The wire representation of this state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Busy => "BUSY",
            Self::Inactive => "INACTIVE",
            Self::Unknown(raw) => raw,
        }
    }
}

impl Default for ResourceState {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResourceState {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for ResourceState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Anything whose settlement can be observed through a reported state.
pub trait Settling {
    /// Current reported state.
    fn state(&self) -> &ResourceState;
}
