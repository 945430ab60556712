use crate::config::{ConfigError, ProviderConfig};
use crate::lifecycle::harness::ConformanceHarness;
use crate::lifecycle::shared_resources::SharedResourceManager;
use crate::lifecycle::tracing::{format_kv, log_prefix};
use crate::provider::CloudProvider;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// What one test did, returned by [`RunContext::end`].
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub suite: String,
    pub name: Option<String>,
    pub duration: Duration,
    /// Calls made during the test, per API call name.
    pub api_calls: BTreeMap<String, u64>,
    pub total_calls: u64,
}

/// Per-suite coordinator.
///
/// Owns its own provider connection and tracks the test currently running. Every log
/// line it writes carries a fixed-width `provider/cloud.suite.test` prefix.
///
/// # Example
///
/// ```ignore
/// let mut ctx = RunContext::open(&harness, "StatelessVMTests")?;
///
/// ctx.begin("listVirtualMachines");
/// if !ctx.is_test_skipped() {
///     let vm = ctx.resources().compute().vm_id(Label::Stateless, None, false, None).await?;
///     ctx.out_kv("Virtual machine", vm.as_deref().unwrap_or("none"));
/// }
/// ctx.end();
/// ctx.close();
/// ```
pub struct RunContext {
    harness: Arc<ConformanceHarness>,
    provider: Arc<dyn CloudProvider>,
    suite: String,
    name: Option<String>,
    prefix: String,
    started: Instant,
}

impl RunContext {
    /// Connects a provider for `suite`.
    ///
    /// Fails with [`ConfigError::ConnectionUnavailable`] if the provider comes back
    /// without a live connection.
    pub fn open(
        harness: &Arc<ConformanceHarness>,
        suite: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let suite = suite.into();
        let provider = harness.connect()?;
        if provider.context().is_none() {
            return Err(ConfigError::ConnectionUnavailable(format!(
                "{}/{} for {}",
                provider.provider_name(),
                provider.cloud_name(),
                suite
            )));
        }

        let prefix = log_prefix(provider.provider_name(), provider.cloud_name(), &suite, None);
        Ok(Self {
            harness: harness.clone(),
            provider,
            suite,
            name: None,
            prefix,
            started: Instant::now(),
        })
    }

    pub fn begin(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
        self.harness.accounting().report("Setup");
        self.harness.accounting().reset();
        self.refresh_prefix();
        self.started = Instant::now();
        self.out("");
        self.out(">>> BEGIN ---------------------------------------------------------------------------------------------->>>");
    }

    /// Closes out the current test: folds its API calls into the run audit, logs them
    /// with the duration and clears the test name.
    pub fn end(&mut self) -> TestSummary {
        let provider = self.provider.provider_name().to_string();
        let cloud = self.provider.cloud_name().to_string();
        let accounting = self.harness.accounting();

        let mut api_calls = BTreeMap::new();
        let calls = accounting.list_apis(&provider, &cloud);
        if !calls.is_empty() {
            self.out("---------- API Log ----------");
            for call in calls {
                let count = accounting.count_across_accounts(&provider, &cloud, &call);
                self.harness.api_audit().record(&call, count);
                self.out_kv(&format!("---> {call}"), count);
                api_calls.insert(call, count);
            }
            let total: u64 = api_calls.values().sum();
            self.out_kv("---> Total Calls", total);
        }

        let duration = self.started.elapsed();
        self.out_kv("Duration", format!("{} seconds", duration.as_secs_f32()));
        self.out("<<< END   ----------------------------------------------------------------------------------------------<<<");
        self.out("");
        accounting.report(&self.prefix);
        accounting.reset();

        let summary = TestSummary {
            suite: self.suite.clone(),
            name: self.name.take(),
            duration,
            total_calls: api_calls.values().sum(),
            api_calls,
        };
        self.refresh_prefix();
        summary
    }

    /// Whether the current test is filtered out by the run's selection rule.
    pub fn is_test_skipped(&self) -> bool {
        let verdict = self
            .harness
            .selector()
            .evaluate(&self.suite, self.name.as_deref());
        if verdict.is_skip() {
            self.skip();
        }
        verdict.is_skip()
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn provider(&self) -> &dyn CloudProvider {
        self.provider.as_ref()
    }

    pub fn resources(&self) -> &SharedResourceManager {
        self.harness.resources()
    }

    /// The configuration of this context's live connection.
    pub fn context(&self) -> Result<&ProviderConfig, ConfigError> {
        self.provider.context().ok_or_else(|| {
            ConfigError::ConnectionUnavailable(format!(
                "{}/{}",
                self.provider.provider_name(),
                self.provider.cloud_name()
            ))
        })
    }

    pub fn out(&self, message: impl Display) {
        info!("{}{}", self.prefix, message);
    }

    pub fn out_kv(&self, key: &str, value: impl Display) {
        self.out(format_kv(key, value));
    }

    pub fn ok(&self, message: impl Display) {
        info!("{}{} (OK)", self.prefix, message);
    }

    pub fn warn(&self, message: impl Display) {
        warn!("{}WARNING: {}", self.prefix, message);
    }

    pub fn error(&self, message: impl Display) {
        error!("{} ERROR: {}", self.prefix, message);
    }

    pub fn skip(&self) {
        self.out("SKIPPING");
    }

    pub fn close(self) {
        self.provider.close();
    }

    fn refresh_prefix(&mut self) {
        self.prefix = log_prefix(
            self.provider.provider_name(),
            self.provider.cloud_name(),
            &self.suite,
            self.name.as_deref(),
        );
    }
}
