use crate::framework::{FrameworkError, LabelCacheClient, ResourceProvisioner};
use crate::model::{Label, ResourceKind, Scope, VmState, VolumeFormat};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Shared virtual machines, volumes, images and snapshots.
#[derive(Clone)]
pub struct ComputeClient {
    pub(crate) vms: LabelCacheClient,
    pub(crate) volumes: LabelCacheClient,
    pub(crate) images: LabelCacheClient,
    pub(crate) snapshots: LabelCacheClient,
    provisioner: Arc<dyn ResourceProvisioner>,
}

impl ComputeClient {
    pub fn new(
        vms: LabelCacheClient,
        volumes: LabelCacheClient,
        images: LabelCacheClient,
        snapshots: LabelCacheClient,
        provisioner: Arc<dyn ResourceProvisioner>,
    ) -> Self {
        Self {
            vms,
            volumes,
            images,
            snapshots,
            provisioner,
        }
    }

    #[instrument(skip(self))]
    pub async fn vm_id(
        &self,
        label: Label,
        desired_state: Option<VmState>,
        provision: bool,
        preferred_data_center: Option<String>,
    ) -> Result<Option<String>, FrameworkError> {
        let scope = Scope::any()
            .in_data_center(preferred_data_center)
            .with_state(desired_state);
        self.vms.get_or_provision(label, scope, provision).await
    }

    #[instrument(skip(self))]
    pub async fn volume_id(
        &self,
        label: Label,
        provision: bool,
        preferred_format: Option<VolumeFormat>,
        preferred_data_center: Option<String>,
    ) -> Result<Option<String>, FrameworkError> {
        let scope = Scope::any()
            .in_data_center(preferred_data_center)
            .with_format(preferred_format);
        self.volumes.get_or_provision(label, scope, provision).await
    }

    #[instrument(skip(self))]
    pub async fn image_id(
        &self,
        label: Label,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        self.images.get_or_provision(label, Scope::any(), provision).await
    }

    #[instrument(skip(self))]
    pub async fn snapshot_id(
        &self,
        label: Label,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        self.snapshots
            .get_or_provision(label, Scope::any(), provision)
            .await
    }

    /// Product the shared virtual machines launch from.
    pub async fn vm_product_id(&self) -> Option<String> {
        self.product_id(ResourceKind::VirtualMachine).await
    }

    /// Product the shared volumes are created from.
    pub async fn volume_product_id(&self) -> Option<String> {
        self.product_id(ResourceKind::Volume).await
    }

    async fn product_id(&self, kind: ResourceKind) -> Option<String> {
        match self.provisioner.product_id(kind).await {
            Ok(product) => product,
            Err(e) => {
                debug!(%kind, error = %e, "Product unavailable");
                None
            }
        }
    }

    /// The data center tests should default to. A failing query reads as "none".
    pub async fn default_data_center(&self, stateless: bool) -> Option<String> {
        match self.provisioner.default_data_center(stateless).await {
            Ok(data_center) => data_center,
            Err(e) => {
                debug!(stateless, error = %e, "Default data center unavailable");
                None
            }
        }
    }
}
