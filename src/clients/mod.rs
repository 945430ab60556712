//! Typed wrappers around [`LabelCacheClient`](crate::framework::LabelCacheClient), one per
//! resource family.

pub mod compute_client;
pub mod identity_client;
pub mod network_client;

pub use compute_client::*;
pub use identity_client::*;
pub use network_client::*;
