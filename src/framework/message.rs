//! # Cache Messages
//!
//! Requests sent from a [`LabelCacheClient`](crate::framework::LabelCacheClient) to its
//! [`LabelCacheActor`](crate::framework::LabelCacheActor).

use crate::framework::error::FrameworkError;
use crate::model::{Label, ResourceHandle, Scope};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum CacheRequest {
    /// Return the cached identifier, provisioning it first when asked to.
    Lookup {
        label: Label,
        scope: Scope,
        provision: bool,
        respond_to: Response<Option<String>>,
    },
    /// Copy of every recorded handle.
    Handles {
        respond_to: Response<Vec<ResourceHandle>>,
    },
    /// Remove and return every recorded handle.
    Drain {
        respond_to: Response<Vec<ResourceHandle>>,
    },
    /// Stop the actor once the reply is sent.
    Shutdown { respond_to: Response<()> },
}
