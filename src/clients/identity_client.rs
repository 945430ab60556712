use crate::framework::{FrameworkError, LabelCacheClient};
use crate::model::{Label, Scope};
use tracing::instrument;

/// Shared keypairs.
#[derive(Clone)]
pub struct IdentityClient {
    pub(crate) keypairs: LabelCacheClient,
}

impl IdentityClient {
    pub fn new(keypairs: LabelCacheClient) -> Self {
        Self { keypairs }
    }

    #[instrument(skip(self))]
    pub async fn keypair_id(
        &self,
        label: Label,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        self.keypairs
            .get_or_provision(label, Scope::any(), provision)
            .await
    }
}
