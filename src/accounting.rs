//! # API Call Accounting
//!
//! Providers count the cloud API calls they make. The harness reads those counters after
//! every test and folds them into a run-wide [`ApiAudit`].

use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Source of per-call counters for a `(provider, cloud)` pair.
pub trait ApiAccounting: Send + Sync {
    /// Names of the API calls recorded since the last reset.
    fn list_apis(&self, provider: &str, cloud: &str) -> Vec<String>;

    /// How often `call` was made since the last reset, summed over all accounts.
    fn count_across_accounts(&self, provider: &str, cloud: &str, call: &str) -> u64;

    /// Flush the collaborator's own report under `prefix`.
    fn report(&self, _prefix: &str) {}

    fn reset(&self) {}
}

/// Accounting for providers that do not count anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccounting;

impl ApiAccounting for NoAccounting {
    fn list_apis(&self, _provider: &str, _cloud: &str) -> Vec<String> {
        Vec::new()
    }

    fn count_across_accounts(&self, _provider: &str, _cloud: &str, _call: &str) -> u64 {
        0
    }
}

/// Run-wide totals per API call.
#[derive(Debug, Default)]
pub struct ApiAudit {
    calls: Mutex<BTreeMap<String, u64>>,
}

impl ApiAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: &str, count: u64) {
        *self.calls.lock().entry(call.to_string()).or_insert(0) += count;
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.calls.lock().clone()
    }

    pub fn total(&self) -> u64 {
        self.calls.lock().values().sum()
    }
}
