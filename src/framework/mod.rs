//! Per-kind resource caches built on the actor pattern.
//!
//! # Main Components
//!
//! - [`ResourceLabelCache`] - `(label, scope) -> id` map for one resource kind
//! - [`LabelCacheActor`] - Task that owns one cache and serializes lookups on it
//! - [`LabelCacheClient`] - Cloneable handle for sending lookups to an actor
//! - [`ResourceProvisioner`] - What the actors call to create, find and delete resources
//! - [`FrameworkError`] / [`ProvisionError`] - Error types
//!
//! # Testing
//!
//! See [`mock`] for in-memory collaborators.

pub mod actor;
pub mod cache;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;
pub mod provisioner;

pub use actor::LabelCacheActor;
pub use cache::ResourceLabelCache;
pub use client::LabelCacheClient;
pub use error::{FrameworkError, ProvisionError};
pub use message::{CacheRequest, Response};
pub use provisioner::{FirewallSupport, Placement, ResourceProvisioner};
