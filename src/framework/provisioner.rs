//! # ResourceProvisioner Trait
//!
//! The capability the cache actors use to create, find and delete cloud resources.
//! Concrete clouds implement it; the framework never talks to a cloud API directly.
//!
//! Only [`provision`](ResourceProvisioner::provision) and
//! [`release`](ResourceProvisioner::release) are required. The remaining methods are
//! optional capability queries whose defaults report "nothing found", "unsupported" or
//! "unknown".

use crate::framework::error::ProvisionError;
use crate::model::{Label, ResourceKind, Scope};
use async_trait::async_trait;

/// Where a provisioned resource actually lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub network: Option<String>,
    pub data_center: Option<String>,
}

/// What the cloud offers for firewalls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirewallSupport {
    /// The account is subscribed to firewall services at all.
    pub subscribed: bool,
    /// Firewalls that are not bound to a VLAN can be created.
    pub general: bool,
    /// Firewalls bound to a VLAN can be created.
    pub vlan: bool,
}

#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    /// Create a new resource of `kind` for `label`, honouring `scope` where the cloud can.
    async fn provision(
        &self,
        kind: ResourceKind,
        label: &Label,
        scope: &Scope,
    ) -> Result<String, ProvisionError>;

    /// Find an existing resource that matches `scope`. Used for stateless lookups.
    async fn discover(
        &self,
        _kind: ResourceKind,
        _scope: &Scope,
    ) -> Result<Option<String>, ProvisionError> {
        Ok(None)
    }

    /// Delete a resource. Called once per owned handle at teardown.
    async fn release(&self, kind: ResourceKind, id: &str) -> Result<(), ProvisionError>;

    /// Report where a resource lives. `Ok(None)` means it no longer exists.
    ///
    /// Clouds that cannot tell report [`ProvisionError::Unsupported`], and callers take
    /// the identifier as is.
    async fn locate(
        &self,
        kind: ResourceKind,
        _id: &str,
    ) -> Result<Option<Placement>, ProvisionError> {
        Err(ProvisionError::Unsupported(kind))
    }

    async fn firewall_support(&self) -> Result<FirewallSupport, ProvisionError> {
        Ok(FirewallSupport::default())
    }

    /// Product (machine size, volume tier) that shared resources of `kind` launch from.
    async fn product_id(&self, _kind: ResourceKind) -> Result<Option<String>, ProvisionError> {
        Ok(None)
    }

    /// Data center that tests should default to.
    async fn default_data_center(&self, _stateless: bool) -> Result<Option<String>, ProvisionError> {
        Ok(None)
    }
}
