//! # Label Cache Actor
//!
//! One `LabelCacheActor` runs per [`ResourceKind`]. It owns that kind's
//! [`ResourceLabelCache`] and processes requests one at a time, so the sequence
//! "check cache, provision, record" can never interleave with another lookup of the
//! same kind. Different kinds run in different tasks and never wait on each other.
//!
//! ## Lookup semantics
//!
//! * **Hit**: the cached identifier is returned. No collaborator is called.
//! * **Miss, `stateless` label**: the provisioner's `discover` is asked for an existing
//!   resource. A discovery error is a lookup failure and reads as "absent".
//!   Stateless resources are never provisioned.
//! * **Miss, `provision == false`**: absent. No collaborator is called.
//! * **Miss, `provision == true`**: `provision` is called. Success is recorded and
//!   returned; failure is propagated and nothing is recorded.

use crate::framework::cache::ResourceLabelCache;
use crate::framework::client::LabelCacheClient;
use crate::framework::error::FrameworkError;
use crate::framework::message::CacheRequest;
use crate::framework::provisioner::ResourceProvisioner;
use crate::model::{CacheKey, Label, ResourceKind, Scope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct LabelCacheActor {
    kind: ResourceKind,
    receiver: mpsc::Receiver<CacheRequest>,
    cache: ResourceLabelCache,
}

impl LabelCacheActor {
    /// Creates a new actor for `kind` and its associated client.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait when it is full.
    pub fn new(kind: ResourceKind, buffer_size: usize) -> (Self, LabelCacheClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            kind,
            receiver,
            cache: ResourceLabelCache::new(kind),
        };
        let client = LabelCacheClient::new(kind, sender);
        (actor, client)
    }

    /// Runs the actor's event loop until the channel closes or a `Shutdown` arrives.
    ///
    /// The provisioner is injected here rather than in `new` so the actor can be built
    /// before the provider connection exists.
    pub async fn run(mut self, provisioner: Arc<dyn ResourceProvisioner>) {
        let kind = self.kind;
        info!(%kind, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CacheRequest::Lookup {
                    label,
                    scope,
                    provision,
                    respond_to,
                } => {
                    let result = self
                        .lookup(provisioner.as_ref(), label, scope, provision)
                        .await;
                    let _ = respond_to.send(result);
                }
                CacheRequest::Handles { respond_to } => {
                    let _ = respond_to.send(Ok(self.cache.handles()));
                }
                CacheRequest::Drain { respond_to } => {
                    let drained = self.cache.drain();
                    debug!(%kind, size = drained.len(), "Drained");
                    let _ = respond_to.send(Ok(drained));
                }
                CacheRequest::Shutdown { respond_to } => {
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(%kind, size = self.cache.len(), "Shutdown");
    }

    async fn lookup(
        &mut self,
        provisioner: &dyn ResourceProvisioner,
        label: Label,
        scope: Scope,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        let kind = self.kind;
        let key = CacheKey::new(label, scope);

        if let Some(id) = self.cache.get(&key) {
            debug!(%kind, label = %key.label, id, "Hit");
            return Ok(Some(id.to_string()));
        }

        if key.label.is_stateless() {
            return match provisioner.discover(kind, &key.scope).await {
                Ok(Some(id)) => {
                    let label = key.label.clone();
                    let id = self.cache.record(key, id).to_string();
                    info!(%kind, %label, %id, size = self.cache.len(), "Discovered");
                    Ok(Some(id))
                }
                Ok(None) => {
                    debug!(%kind, "Nothing to discover");
                    Ok(None)
                }
                Err(e) => {
                    debug!(%kind, error = %e, "Discovery failed, treating as absent");
                    Ok(None)
                }
            };
        }

        if !provision {
            debug!(%kind, label = %key.label, "Miss");
            return Ok(None);
        }

        match provisioner.provision(kind, &key.label, &key.scope).await {
            Ok(id) => {
                let label = key.label.clone();
                let id = self.cache.record(key, id).to_string();
                info!(%kind, %label, %id, size = self.cache.len(), "Provisioned");
                Ok(Some(id))
            }
            Err(e) => {
                warn!(%kind, label = %key.label, error = %e, "Provisioning failed");
                Err(FrameworkError::Provisioning(e))
            }
        }
    }
}
