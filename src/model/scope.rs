use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state a test wants a shared virtual machine to be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VmState {
    Pending,
    Running,
    Paused,
    Stopped,
    Suspended,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeFormat {
    Block,
    Nfs,
}

impl fmt::Display for VolumeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeFormat::Block => f.write_str("block"),
            VolumeFormat::Nfs => f.write_str("nfs"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpVersion {
    Ipv4,
    Ipv6,
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::Ipv4 => f.write_str("ipv4"),
            IpVersion::Ipv6 => f.write_str("ipv6"),
        }
    }
}

/// Extra key fields that narrow a lookup beyond `(kind, label)`.
///
/// A `None` field means "any". Two scopes that differ in any field are distinct
/// cache keys; nothing is ever widened or rewritten in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    pub data_center: Option<String>,
    pub network: Option<String>,
    pub state: Option<VmState>,
    pub format: Option<String>,
}

impl Scope {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn in_data_center(mut self, data_center: Option<impl Into<String>>) -> Self {
        self.data_center = data_center.map(Into::into);
        self
    }

    pub fn in_network(mut self, network: Option<impl Into<String>>) -> Self {
        self.network = network.map(Into::into);
        self
    }

    pub fn with_state(mut self, state: Option<VmState>) -> Self {
        self.state = state;
        self
    }

    pub fn with_format(mut self, format: Option<impl fmt::Display>) -> Self {
        self.format = format.map(|f| f.to_string());
        self
    }

    pub fn is_any(&self) -> bool {
        *self == Scope::default()
    }
}
