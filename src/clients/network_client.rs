use crate::framework::{FrameworkError, LabelCacheClient, ResourceProvisioner};
use crate::model::{IpVersion, Label, ResourceKind, Scope};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How many derived labels a VLAN firewall lookup may try after the first one lands in
/// the wrong network.
pub const MAX_SCOPE_RETRIES: u32 = 3;

/// Shared VLANs, subnets, firewalls and static IPs.
#[derive(Clone)]
pub struct NetworkClient {
    pub(crate) vlans: LabelCacheClient,
    pub(crate) subnets: LabelCacheClient,
    pub(crate) firewalls: LabelCacheClient,
    pub(crate) static_ips: LabelCacheClient,
    provisioner: Arc<dyn ResourceProvisioner>,
}

impl NetworkClient {
    pub fn new(
        vlans: LabelCacheClient,
        subnets: LabelCacheClient,
        firewalls: LabelCacheClient,
        static_ips: LabelCacheClient,
        provisioner: Arc<dyn ResourceProvisioner>,
    ) -> Self {
        Self {
            vlans,
            subnets,
            firewalls,
            static_ips,
            provisioner,
        }
    }

    #[instrument(skip(self))]
    pub async fn vlan_id(
        &self,
        label: Label,
        provision: bool,
        preferred_data_center: Option<String>,
    ) -> Result<Option<String>, FrameworkError> {
        let scope = Scope::any().in_data_center(preferred_data_center);
        self.vlans.get_or_provision(label, scope, provision).await
    }

    #[instrument(skip(self))]
    pub async fn subnet_id(
        &self,
        label: Label,
        provision: bool,
        vlan: Option<String>,
        preferred_data_center: Option<String>,
    ) -> Result<Option<String>, FrameworkError> {
        let scope = Scope::any()
            .in_network(vlan)
            .in_data_center(preferred_data_center);
        self.subnets.get_or_provision(label, scope, provision).await
    }

    /// A firewall that is not bound to any VLAN.
    #[instrument(skip(self))]
    pub async fn general_firewall_id(
        &self,
        label: Label,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        self.firewalls
            .get_or_provision(label, Scope::any(), provision)
            .await
    }

    /// A firewall that lives in `in_vlan`.
    ///
    /// Without a VLAN, a stateless label looks up the stateless VLAN and any other label
    /// uses (and if needed provisions) the stateful one. No VLAN means no firewall.
    ///
    /// Clouds do not always create a firewall where they were asked to. Each identifier
    /// is checked against the cloud's own record of its network; a mismatch is retried
    /// under [`Label::derived`] up to [`MAX_SCOPE_RETRIES`] times. A firewall the cloud no
    /// longer knows about reads as absent. If its placement cannot be read, or records
    /// no network, the identifier is returned unchecked.
    #[instrument(skip(self))]
    pub async fn vlan_firewall_id(
        &self,
        label: Label,
        provision: bool,
        in_vlan: Option<String>,
    ) -> Result<Option<String>, FrameworkError> {
        let vlan = match in_vlan {
            Some(vlan) => vlan,
            None => {
                let resolved = if label.is_stateless() {
                    self.vlan_id(Label::Stateless, false, None).await?
                } else {
                    self.vlan_id(Label::Stateful, true, None).await?
                };
                match resolved {
                    Some(vlan) => vlan,
                    None => {
                        debug!(%label, "No VLAN for firewall");
                        return Ok(None);
                    }
                }
            }
        };

        let mut current = label.clone();
        for attempt in 0..=MAX_SCOPE_RETRIES {
            let scope = Scope::any().in_network(Some(vlan.as_str()));
            let Some(id) = self
                .firewalls
                .get_or_provision(current.clone(), scope, provision)
                .await?
            else {
                return Ok(None);
            };

            match self.provisioner.locate(ResourceKind::Firewall, &id).await {
                Ok(None) => {
                    debug!(%id, "Firewall is gone");
                    return Ok(None);
                }
                Ok(Some(placement)) if placement.network.as_deref() == Some(vlan.as_str()) => {
                    if attempt > 0 {
                        info!(%id, label = %current, %vlan, "Firewall placed after retry");
                    }
                    return Ok(Some(id));
                }
                Ok(Some(placement)) if placement.network.is_none() => {
                    debug!(%id, "Firewall network unknown");
                    return Ok(Some(id));
                }
                Ok(Some(placement)) => {
                    warn!(
                        %id,
                        label = %current,
                        expected = %vlan,
                        actual = ?placement.network,
                        "Firewall landed in the wrong network"
                    );
                    current = current.derived();
                }
                Err(e) => {
                    debug!(%id, error = %e, "Cannot read firewall placement");
                    return Ok(Some(id));
                }
            }
        }

        Err(FrameworkError::ScopeMismatch {
            kind: ResourceKind::Firewall,
            label,
            network: vlan,
            attempts: MAX_SCOPE_RETRIES + 1,
        })
    }

    /// Whatever firewall the cloud can offer.
    ///
    /// Clouds with general firewalls get a general one for `label`. Clouds that only do
    /// VLAN firewalls get a fresh `removed` one in the stateful VLAN. An unsubscribed
    /// account or a failing capability query means no firewall.
    #[instrument(skip(self))]
    pub async fn any_firewall_id(
        &self,
        label: Label,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        let support = match self.provisioner.firewall_support().await {
            Ok(support) => support,
            Err(e) => {
                debug!(error = %e, "Firewall support unavailable");
                return Ok(None);
            }
        };
        if !support.subscribed {
            return Ok(None);
        }
        if support.general {
            self.general_firewall_id(label, provision).await
        } else if support.vlan {
            self.vlan_firewall_id(Label::Removed, true, None).await
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self))]
    pub async fn static_ip_id(
        &self,
        label: Label,
        provision: bool,
        version: Option<IpVersion>,
    ) -> Result<Option<String>, FrameworkError> {
        let scope = Scope::any().with_format(version);
        self.static_ips.get_or_provision(label, scope, provision).await
    }
}
