//! # Label Cache Client
//!
//! Cloneable handle for talking to one [`LabelCacheActor`](crate::framework::LabelCacheActor).

use crate::framework::error::FrameworkError;
use crate::framework::message::CacheRequest;
use crate::model::{Label, ResourceHandle, ResourceKind, Scope};
use tokio::sync::{mpsc, oneshot};

#[derive(Clone)]
pub struct LabelCacheClient {
    kind: ResourceKind,
    sender: mpsc::Sender<CacheRequest>,
}

impl LabelCacheClient {
    pub fn new(kind: ResourceKind, sender: mpsc::Sender<CacheRequest>) -> Self {
        Self { kind, sender }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub async fn get_or_provision(
        &self,
        label: Label,
        scope: Scope,
        provision: bool,
    ) -> Result<Option<String>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Lookup {
                label,
                scope,
                provision,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn handles(&self) -> Result<Vec<ResourceHandle>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Handles { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn drain(&self) -> Result<Vec<ResourceHandle>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Drain { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Shutdown { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
