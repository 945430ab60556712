//! # Framework Errors
//!
//! Errors raised by the cache actors and by the provisioning collaborator behind them.
//! Lookup failures that only mean "feature unavailable" never surface here; callers
//! get `Ok(None)` for those.

use crate::model::{Label, ResourceKind};

/// Failure reported by a [`ResourceProvisioner`](crate::framework::ResourceProvisioner).
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Failed to provision {kind} for label '{label}': {reason}")]
    Failed {
        kind: ResourceKind,
        label: Label,
        reason: String,
    },
    #[error("Failed to release {kind} {id}: {reason}")]
    Release {
        kind: ResourceKind,
        id: String,
        reason: String,
    },
    #[error("Lookup failed: {0}")]
    Lookup(String),
    #[error("{0} is not supported by this cloud")]
    Unsupported(ResourceKind),
}

/// Errors that can occur within the shared resource framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error(transparent)]
    Provisioning(#[from] ProvisionError),
    #[error("{kind} for label '{label}' never landed in network {network} after {attempts} attempts")]
    ScopeMismatch {
        kind: ResourceKind,
        label: Label,
        network: String,
        attempts: u32,
    },
}
