use super::{Label, ResourceKind, Scope};
use serde::{Deserialize, Serialize};

/// Cache key within one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub label: Label,
    pub scope: Scope,
}

impl CacheKey {
    pub fn new(label: Label, scope: Scope) -> Self {
        Self { label, scope }
    }
}

/// A recorded `(kind, label, scope) -> identifier` mapping.
///
/// Handles are owned by the cache actor of their kind; everyone else only sees copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub label: Label,
    pub scope: Scope,
    pub id: String,
}

impl ResourceHandle {
    /// Whether teardown should try to delete this resource.
    pub fn is_owned(&self) -> bool {
        !self.label.is_stateless()
    }
}
