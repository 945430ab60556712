use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of cloud resource shared between test cases.
///
/// Every kind gets its own cache actor, so lookups for unrelated kinds never
/// wait on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    VirtualMachine,
    Volume,
    Snapshot,
    Image,
    StaticIp,
    Firewall,
    Subnet,
    Vlan,
    Keypair,
}

impl ResourceKind {
    /// All kinds in teardown order: dependents before the resources they live in.
    pub const TEARDOWN_ORDER: [ResourceKind; 9] = [
        ResourceKind::VirtualMachine,
        ResourceKind::Volume,
        ResourceKind::Snapshot,
        ResourceKind::Image,
        ResourceKind::StaticIp,
        ResourceKind::Firewall,
        ResourceKind::Subnet,
        ResourceKind::Vlan,
        ResourceKind::Keypair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::VirtualMachine => "vm",
            ResourceKind::Volume => "volume",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Image => "image",
            ResourceKind::StaticIp => "static_ip",
            ResourceKind::Firewall => "firewall",
            ResourceKind::Subnet => "subnet",
            ResourceKind::Vlan => "vlan",
            ResourceKind::Keypair => "keypair",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
