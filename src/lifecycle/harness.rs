use crate::accounting::{ApiAccounting, ApiAudit};
use crate::config::{ConfigError, HarnessConfig};
use crate::lifecycle::shared_resources::{SharedResourceManager, TeardownReport};
use crate::provider::{CloudProvider, ProviderRegistry};
use crate::selector::SelectionRule;
use std::sync::Arc;
use tracing::info;

/// Run-wide state shared by every suite.
///
/// Built once before the first test. Holds the selection rule, the shared resource
/// pool and the run's API audit. Per-suite work goes through
/// [`RunContext`](crate::lifecycle::RunContext).
pub struct ConformanceHarness {
    config: HarnessConfig,
    registry: ProviderRegistry,
    selector: SelectionRule,
    provider: Arc<dyn CloudProvider>,
    resources: SharedResourceManager,
    accounting: Arc<dyn ApiAccounting>,
    audit: ApiAudit,
}

impl ConformanceHarness {
    /// Connects the provider that owns the shared resources and starts the pool.
    ///
    /// Must be called inside a tokio runtime. Any configuration error is fatal.
    pub fn init(
        config: HarnessConfig,
        registry: ProviderRegistry,
        accounting: Arc<dyn ApiAccounting>,
    ) -> Result<Arc<Self>, ConfigError> {
        let provider = registry.connect(&config.provider)?;
        let resources = SharedResourceManager::start(provider.provisioner());
        let selector =
            SelectionRule::parse(config.inclusions.as_deref(), config.exclusions.as_deref());

        info!(
            provider = provider.provider_name(),
            cloud = provider.cloud_name(),
            inclusions = ?selector.inclusions(),
            exclusions = ?selector.exclusions(),
            "Harness initialized"
        );
        accounting.report("Init");
        accounting.reset();

        Ok(Arc::new(Self {
            config,
            registry,
            selector,
            provider,
            resources,
            accounting,
            audit: ApiAudit::new(),
        }))
    }

    /// [`init`](Self::init) with configuration read from `CONFORMANCE_*` variables.
    pub fn from_env(
        registry: ProviderRegistry,
        accounting: Arc<dyn ApiAccounting>,
    ) -> Result<Arc<Self>, ConfigError> {
        Self::init(HarnessConfig::from_env()?, registry, accounting)
    }

    /// A fresh provider connection for one suite.
    pub fn connect(&self) -> Result<Arc<dyn CloudProvider>, ConfigError> {
        self.registry.connect(&self.config.provider)
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn selector(&self) -> &SelectionRule {
        &self.selector
    }

    pub fn resources(&self) -> &SharedResourceManager {
        &self.resources
    }

    pub fn accounting(&self) -> &dyn ApiAccounting {
        self.accounting.as_ref()
    }

    /// Per-call totals over every test that has ended so far.
    pub fn api_audit(&self) -> &ApiAudit {
        &self.audit
    }

    /// Release the shared resources and disconnect.
    pub async fn cleanup(&self) -> TeardownReport {
        self.accounting.report("Clean Up");
        let report = self.resources.close().await;
        self.provider.close();
        info!(
            total_calls = self.audit.total(),
            failures = report.failures.len(),
            "Harness cleaned up"
        );
        report
    }
}
