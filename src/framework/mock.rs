//! # Mock Framework & Testing Guide
//!
//! In-memory stand-ins for the collaborators the harness depends on, so that the cache
//! actors, the typed clients and the run context can be tested without a cloud.
//!
//! | Double | Stands in for | Records |
//! |--------|---------------|---------|
//! | [`MockProvisioner`] | [`ResourceProvisioner`] | every provision, discovery and release |
//! | [`MockProvider`] | [`CloudProvider`] | connection state |
//! | [`MockAccounting`] | [`ApiAccounting`] | reports and counters |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 1: Single cache actor</b></summary>
//!
//! ```rust
//! use conformance_coordinator::framework::mock::MockProvisioner;
//! use conformance_coordinator::framework::LabelCacheActor;
//! use conformance_coordinator::model::{Label, ResourceKind, Scope};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let provisioner = Arc::new(MockProvisioner::new());
//!     let (actor, client) = LabelCacheActor::new(ResourceKind::Volume, 8);
//!     tokio::spawn(actor.run(provisioner.clone()));
//!
//!     let id = client.get_or_provision(Label::Stateful, Scope::any(), true).await.unwrap();
//!     assert_eq!(id.as_deref(), Some("volume-1"));
//!     assert_eq!(provisioner.provision_count(ResourceKind::Volume), 1);
//! }
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Scripted failures</b></summary>
//!
//! Expectations are consumed in order, per kind. Kinds without a scripted expectation
//! get generated identifiers (`vm-1`, `vm-2`, ...).
//!
//! ```rust
//! use conformance_coordinator::framework::mock::MockProvisioner;
//! use conformance_coordinator::model::ResourceKind;
//!
//! let mock = MockProvisioner::new();
//! mock.expect_provision(ResourceKind::Firewall).return_ok("fw-outside");
//! mock.expect_provision(ResourceKind::Firewall).return_err("quota exceeded");
//! mock.fail_release("vm-2");
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 3: Full harness</b></summary>
//!
//! Register [`MockProvider::constructor`] in a
//! [`ProviderRegistry`](crate::provider::ProviderRegistry) and drive a
//! [`ConformanceHarness`](crate::lifecycle::ConformanceHarness) end to end. See
//! `tests/harness_test.rs`.
//! </details>

use crate::accounting::ApiAccounting;
use crate::config::{ConfigError, ProviderConfig};
use crate::framework::error::ProvisionError;
use crate::framework::provisioner::{FirewallSupport, Placement, ResourceProvisioner};
use crate::model::{Label, ResourceKind, Scope};
use crate::provider::CloudProvider;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// PROVISIONER
// =============================================================================

#[derive(Default)]
struct ProvisionerState {
    next_id: HashMap<ResourceKind, u32>,
    expectations: HashMap<ResourceKind, VecDeque<Result<String, String>>>,
    provisions: Vec<(ResourceKind, Label, Scope)>,
    discoveries: Vec<(ResourceKind, Scope)>,
    releases: Vec<(ResourceKind, String)>,
    existing: HashMap<ResourceKind, String>,
    placements: HashMap<String, Placement>,
    failing_releases: HashSet<String>,
    failing_discovery: bool,
    failing_locate: bool,
    firewall_support: Option<FirewallSupport>,
    default_data_center: Option<String>,
    products: HashMap<ResourceKind, String>,
}

/// Scriptable, call-recording [`ResourceProvisioner`].
pub struct MockProvisioner {
    state: Arc<Mutex<ProvisionerState>>,
    latency: Option<Duration>,
}

impl Default for MockProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvisioner {
    /// Creates a provisioner that generates identifiers and supports nothing optional.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProvisionerState {
                firewall_support: Some(FirewallSupport::default()),
                ..Default::default()
            })),
            latency: None,
        }
    }

    /// Delay every `provision` call, to widen race windows in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Expects a `provision` call for `kind`.
    pub fn expect_provision(&self, kind: ResourceKind) -> ProvisionExpectationBuilder {
        ProvisionExpectationBuilder {
            kind,
            state: self.state.clone(),
        }
    }

    /// Make `discover` find `id` for `kind`.
    pub fn with_existing(&self, kind: ResourceKind, id: impl Into<String>) {
        self.state.lock().existing.insert(kind, id.into());
    }

    pub fn fail_discovery(&self) {
        self.state.lock().failing_discovery = true;
    }

    /// Pin where `id` lives. Takes precedence over the scope it was provisioned with.
    pub fn place(&self, id: impl Into<String>, network: Option<&str>) {
        self.state.lock().placements.insert(
            id.into(),
            Placement {
                network: network.map(str::to_string),
                data_center: None,
            },
        );
    }

    pub fn fail_locate(&self) {
        self.state.lock().failing_locate = true;
    }

    pub fn fail_release(&self, id: impl Into<String>) {
        self.state.lock().failing_releases.insert(id.into());
    }

    pub fn set_firewall_support(&self, support: FirewallSupport) {
        self.state.lock().firewall_support = Some(support);
    }

    /// Make the firewall capability query itself fail.
    pub fn fail_firewall_support(&self) {
        self.state.lock().firewall_support = None;
    }

    pub fn set_default_data_center(&self, data_center: impl Into<String>) {
        self.state.lock().default_data_center = Some(data_center.into());
    }

    pub fn set_product(&self, kind: ResourceKind, product: impl Into<String>) {
        self.state.lock().products.insert(kind, product.into());
    }

    pub fn provision_count(&self, kind: ResourceKind) -> usize {
        self.state
            .lock()
            .provisions
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }

    pub fn provisions(&self) -> Vec<(ResourceKind, Label, Scope)> {
        self.state.lock().provisions.clone()
    }

    pub fn discovery_count(&self) -> usize {
        self.state.lock().discoveries.len()
    }

    /// Every release attempt, successful or not, in call order.
    pub fn releases(&self) -> Vec<(ResourceKind, String)> {
        self.state.lock().releases.clone()
    }

    /// Verifies that all scripted expectations were consumed.
    pub fn verify(&self) {
        let state = self.state.lock();
        let remaining: usize = state.expectations.values().map(VecDeque::len).sum();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl ResourceProvisioner for MockProvisioner {
    async fn provision(
        &self,
        kind: ResourceKind,
        label: &Label,
        scope: &Scope,
    ) -> Result<String, ProvisionError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.lock();
        state.provisions.push((kind, label.clone(), scope.clone()));

        let scripted = state
            .expectations
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        let id = match scripted {
            Some(Ok(id)) => id,
            Some(Err(reason)) => {
                return Err(ProvisionError::Failed {
                    kind,
                    label: label.clone(),
                    reason,
                })
            }
            None => {
                let counter = state.next_id.entry(kind).or_insert(0);
                *counter += 1;
                format!("{}-{}", kind, counter)
            }
        };
        state.placements.entry(id.clone()).or_insert(Placement {
            network: scope.network.clone(),
            data_center: scope.data_center.clone(),
        });
        Ok(id)
    }

    async fn discover(
        &self,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<Option<String>, ProvisionError> {
        let mut state = self.state.lock();
        state.discoveries.push((kind, scope.clone()));
        if state.failing_discovery {
            return Err(ProvisionError::Lookup(format!("cannot list {kind}")));
        }
        Ok(state.existing.get(&kind).cloned())
    }

    async fn release(&self, kind: ResourceKind, id: &str) -> Result<(), ProvisionError> {
        let mut state = self.state.lock();
        state.releases.push((kind, id.to_string()));
        if state.failing_releases.contains(id) {
            return Err(ProvisionError::Release {
                kind,
                id: id.to_string(),
                reason: "still in use".into(),
            });
        }
        state.placements.remove(id);
        Ok(())
    }

    async fn locate(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<Placement>, ProvisionError> {
        let state = self.state.lock();
        if state.failing_locate {
            return Err(ProvisionError::Lookup(format!("cannot read {kind} {id}")));
        }
        Ok(state.placements.get(id).cloned())
    }

    async fn firewall_support(&self) -> Result<FirewallSupport, ProvisionError> {
        self.state
            .lock()
            .firewall_support
            .ok_or_else(|| ProvisionError::Lookup("firewall support query failed".into()))
    }

    async fn product_id(&self, kind: ResourceKind) -> Result<Option<String>, ProvisionError> {
        Ok(self.state.lock().products.get(&kind).cloned())
    }

    async fn default_data_center(&self, _stateless: bool) -> Result<Option<String>, ProvisionError> {
        Ok(self.state.lock().default_data_center.clone())
    }
}

/// Builder for `provision` expectations.
pub struct ProvisionExpectationBuilder {
    kind: ResourceKind,
    state: Arc<Mutex<ProvisionerState>>,
}

impl ProvisionExpectationBuilder {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, id: impl Into<String>) {
        self.push(Ok(id.into()));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, reason: impl Into<String>) {
        self.push(Err(reason.into()));
    }

    fn push(self, response: Result<String, String>) {
        self.state
            .lock()
            .expectations
            .entry(self.kind)
            .or_default()
            .push_back(response);
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// [`CloudProvider`] backed by a shared [`MockProvisioner`].
pub struct MockProvider {
    config: ProviderConfig,
    provisioner: Arc<MockProvisioner>,
    connected: AtomicBool,
}

impl MockProvider {
    pub fn new(config: ProviderConfig, provisioner: Arc<MockProvisioner>) -> Self {
        Self {
            config,
            provisioner,
            connected: AtomicBool::new(true),
        }
    }

    /// Registry constructor that hands every connection the same provisioner.
    pub fn constructor(
        provisioner: Arc<MockProvisioner>,
    ) -> impl Fn(&ProviderConfig) -> Result<Arc<dyn CloudProvider>, ConfigError> + Send + Sync + 'static
    {
        move |config: &ProviderConfig| {
            let provider: Arc<dyn CloudProvider> =
                Arc::new(MockProvider::new(config.clone(), provisioner.clone()));
            Ok(provider)
        }
    }

    /// Registry constructor whose providers come back without a live connection.
    pub fn offline_constructor(
        provisioner: Arc<MockProvisioner>,
    ) -> impl Fn(&ProviderConfig) -> Result<Arc<dyn CloudProvider>, ConfigError> + Send + Sync + 'static
    {
        move |config: &ProviderConfig| {
            let provider = MockProvider::new(config.clone(), provisioner.clone());
            provider.disconnect();
            let provider: Arc<dyn CloudProvider> = Arc::new(provider);
            Ok(provider)
        }
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl CloudProvider for MockProvider {
    fn provider_name(&self) -> &str {
        self.config.provider_name.as_deref().unwrap_or("Mock")
    }

    fn cloud_name(&self) -> &str {
        self.config.cloud_name.as_deref().unwrap_or("Local")
    }

    fn context(&self) -> Option<&ProviderConfig> {
        self.connected
            .load(Ordering::SeqCst)
            .then_some(&self.config)
    }

    fn provisioner(&self) -> Arc<dyn ResourceProvisioner> {
        self.provisioner.clone()
    }

    fn close(&self) {
        self.disconnect();
    }
}

// =============================================================================
// ACCOUNTING
// =============================================================================

/// [`ApiAccounting`] with counters the test sets by hand.
#[derive(Default)]
pub struct MockAccounting {
    calls: Mutex<BTreeMap<String, u64>>,
    reports: Mutex<Vec<String>>,
}

impl MockAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the provider made `call` `count` more times.
    pub fn record_call(&self, call: &str, count: u64) {
        *self.calls.lock().entry(call.to_string()).or_insert(0) += count;
    }

    /// Prefixes passed to `report`, in order.
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

impl ApiAccounting for MockAccounting {
    fn list_apis(&self, _provider: &str, _cloud: &str) -> Vec<String> {
        self.calls.lock().keys().cloned().collect()
    }

    fn count_across_accounts(&self, _provider: &str, _cloud: &str, call: &str) -> u64 {
        self.calls.lock().get(call).copied().unwrap_or(0)
    }

    fn report(&self, prefix: &str) {
        self.reports.lock().push(prefix.to_string());
    }

    fn reset(&self) {
        self.calls.lock().clear();
    }
}
