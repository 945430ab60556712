//! # ResourceLabelCache
//!
//! Per-kind map from `(label, scope)` to a resource identifier. A leaf: no I/O, no
//! locking. The owning [`LabelCacheActor`](crate::framework::LabelCacheActor) is the
//! only writer, which is what makes check-then-provision-then-record atomic per kind.

use crate::model::{CacheKey, ResourceHandle, ResourceKind};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct ResourceLabelCache {
    kind: ResourceKind,
    entries: BTreeMap<CacheKey, String>,
}

impl ResourceLabelCache {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn get(&self, key: &CacheKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Record `id` under `key` unless the key is already taken.
    ///
    /// Returns the identifier that is now cached, which is the earlier one when the
    /// key was already present. Entries are never overwritten.
    pub fn record(&mut self, key: CacheKey, id: String) -> &str {
        self.entries.entry(key).or_insert(id).as_str()
    }

    pub fn handles(&self) -> Vec<ResourceHandle> {
        self.entries
            .iter()
            .map(|(key, id)| self.handle(key, id))
            .collect()
    }

    /// Remove and return every handle.
    pub fn drain(&mut self) -> Vec<ResourceHandle> {
        let entries = std::mem::take(&mut self.entries);
        entries
            .iter()
            .map(|(key, id)| self.handle(key, id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn handle(&self, key: &CacheKey, id: &str) -> ResourceHandle {
        ResourceHandle {
            kind: self.kind,
            label: key.label.clone(),
            scope: key.scope.clone(),
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Label, Scope, VmState};

    fn key(label: Label, dc: Option<&str>) -> CacheKey {
        CacheKey::new(label, Scope::any().in_data_center(dc))
    }

    #[test]
    fn test_record_keeps_first_identifier() {
        let mut cache = ResourceLabelCache::new(ResourceKind::VirtualMachine);
        assert_eq!(cache.record(key(Label::Stateful, None), "vm-1".into()), "vm-1");
        assert_eq!(cache.record(key(Label::Stateful, None), "vm-2".into()), "vm-1");
        assert_eq!(cache.get(&key(Label::Stateful, None)), Some("vm-1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_scope_is_part_of_the_key() {
        let mut cache = ResourceLabelCache::new(ResourceKind::VirtualMachine);
        cache.record(key(Label::Stateful, Some("dc-1")), "vm-1".into());
        assert_eq!(cache.get(&key(Label::Stateful, None)), None);
        assert_eq!(cache.get(&key(Label::Stateful, Some("dc-2"))), None);

        let running = CacheKey::new(
            Label::Stateful,
            Scope::any().in_data_center(Some("dc-1")).with_state(Some(VmState::Running)),
        );
        assert_eq!(cache.get(&running), None);
        cache.record(running.clone(), "vm-2".into());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_drain_empties_and_reports_kind() {
        let mut cache = ResourceLabelCache::new(ResourceKind::Volume);
        cache.record(key(Label::Removed, None), "vol-1".into());
        cache.record(key(Label::Stateless, None), "vol-2".into());

        let drained = cache.drain();
        assert_eq!(drained.len(), 2);
        assert!(drained.iter().all(|h| h.kind == ResourceKind::Volume));
        assert!(cache.is_empty());
        assert!(cache.handles().is_empty());
    }
}
