use crate::clients::{ComputeClient, IdentityClient, NetworkClient};
use crate::framework::{FrameworkError, LabelCacheActor, LabelCacheClient, ResourceProvisioner};
use crate::model::{Label, ResourceHandle, ResourceKind, Scope};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Request channel capacity of every cache actor.
const BUFFER_SIZE: usize = 32;

/// Process-wide pool of shared test resources.
///
/// `SharedResourceManager` is responsible for:
/// - **Lifecycle**: starting one cache actor per [`ResourceKind`] and stopping them all
/// - **Wiring**: handing every actor the run's provisioner
/// - **Teardown**: releasing every owned resource at the end of the run
///
/// # Example
///
/// ```ignore
/// let resources = SharedResourceManager::start(provider.provisioner());
///
/// let vm = resources.compute().vm_id(Label::Stateful, None, true, None).await?;
/// let report = resources.close().await;
/// ```
pub struct SharedResourceManager {
    compute: ComputeClient,
    network: NetworkClient,
    identity: IdentityClient,
    provisioner: Arc<dyn ResourceProvisioner>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// One handle whose release failed.
#[derive(Debug)]
pub struct TeardownFailure {
    pub handle: ResourceHandle,
    pub reason: String,
}

/// Outcome of [`SharedResourceManager::close`].
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Release calls made.
    pub attempted: usize,
    pub released: Vec<ResourceHandle>,
    pub failures: Vec<TeardownFailure>,
    /// Stateless handles and repeated identifiers that were left alone.
    pub skipped: usize,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl SharedResourceManager {
    /// Spawns every cache actor. Must be called inside a tokio runtime.
    pub fn start(provisioner: Arc<dyn ResourceProvisioner>) -> Self {
        let mut handles = Vec::with_capacity(ResourceKind::TEARDOWN_ORDER.len());
        let mut spawn = |kind: ResourceKind| {
            let (actor, client) = LabelCacheActor::new(kind, BUFFER_SIZE);
            handles.push(tokio::spawn(actor.run(provisioner.clone())));
            client
        };

        let compute = ComputeClient::new(
            spawn(ResourceKind::VirtualMachine),
            spawn(ResourceKind::Volume),
            spawn(ResourceKind::Image),
            spawn(ResourceKind::Snapshot),
            provisioner.clone(),
        );
        let network = NetworkClient::new(
            spawn(ResourceKind::Vlan),
            spawn(ResourceKind::Subnet),
            spawn(ResourceKind::Firewall),
            spawn(ResourceKind::StaticIp),
            provisioner.clone(),
        );
        let identity = IdentityClient::new(spawn(ResourceKind::Keypair));

        info!(actors = handles.len(), "Shared resources started");
        Self {
            compute,
            network,
            identity,
            provisioner,
            handles: Mutex::new(handles),
        }
    }

    pub fn compute(&self) -> &ComputeClient {
        &self.compute
    }

    pub fn network(&self) -> &NetworkClient {
        &self.network
    }

    pub fn identity(&self) -> &IdentityClient {
        &self.identity
    }

    /// Cached identifier for `(kind, label, scope)`, provisioning it when allowed.
    pub async fn get_or_provision(
        &self,
        kind: ResourceKind,
        label: Label,
        scope: Scope,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        self.cache(kind)
            .get_or_provision(label, scope, provision)
            .await
    }

    /// Every handle currently recorded, in teardown order.
    pub async fn handles(&self) -> Result<Vec<ResourceHandle>, FrameworkError> {
        let mut all = Vec::new();
        for kind in ResourceKind::TEARDOWN_ORDER {
            all.extend(self.cache(kind).handles().await?);
        }
        Ok(all)
    }

    /// Release every owned resource, then stop the actors.
    ///
    /// Kinds are drained in [`ResourceKind::TEARDOWN_ORDER`]. A failed release is
    /// logged and recorded in the report; it never stops the remaining releases.
    pub async fn close(&self) -> TeardownReport {
        info!("Releasing shared resources...");
        let mut report = TeardownReport::default();

        for kind in ResourceKind::TEARDOWN_ORDER {
            let drained = match self.cache(kind).drain().await {
                Ok(drained) => drained,
                Err(e) => {
                    warn!(%kind, error = %e, "Cannot drain cache");
                    continue;
                }
            };

            let mut seen = BTreeSet::new();
            for handle in drained {
                if !handle.is_owned() || !seen.insert(handle.id.clone()) {
                    report.skipped += 1;
                    continue;
                }
                report.attempted += 1;
                match self.provisioner.release(kind, &handle.id).await {
                    Ok(()) => {
                        info!(%kind, id = %handle.id, label = %handle.label, "Released");
                        report.released.push(handle);
                    }
                    Err(e) => {
                        warn!(%kind, id = %handle.id, error = %e, "Release failed");
                        report.failures.push(TeardownFailure {
                            handle,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        self.shutdown().await;
        info!(
            attempted = report.attempted,
            released = report.released.len(),
            failed = report.failures.len(),
            "Shared resources closed"
        );
        report
    }

    async fn shutdown(&self) {
        for kind in ResourceKind::TEARDOWN_ORDER {
            // Already stopped on a second close.
            let _ = self.cache(kind).shutdown().await;
        }
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
            }
        }
    }

    fn cache(&self, kind: ResourceKind) -> &LabelCacheClient {
        match kind {
            ResourceKind::VirtualMachine => &self.compute.vms,
            ResourceKind::Volume => &self.compute.volumes,
            ResourceKind::Snapshot => &self.compute.snapshots,
            ResourceKind::Image => &self.compute.images,
            ResourceKind::StaticIp => &self.network.static_ips,
            ResourceKind::Firewall => &self.network.firewalls,
            ResourceKind::Subnet => &self.network.subnets,
            ResourceKind::Vlan => &self.network.vlans,
            ResourceKind::Keypair => &self.identity.keypairs,
        }
    }
}
