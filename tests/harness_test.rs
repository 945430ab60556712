use conformance_coordinator::config::{ConfigError, HarnessConfig, ProviderConfig};
use conformance_coordinator::framework::mock::{MockAccounting, MockProvider, MockProvisioner};
use conformance_coordinator::lifecycle::{ConformanceHarness, RunContext};
use conformance_coordinator::model::{Label, ResourceKind, Scope, VmState};
use conformance_coordinator::provider::ProviderRegistry;
use std::sync::Arc;

fn config(inclusions: Option<&str>, exclusions: Option<&str>) -> HarnessConfig {
    HarnessConfig {
        provider: ProviderConfig {
            provider_class: Some("mock".into()),
            provider_name: Some("Acme".into()),
            cloud_name: Some("East".into()),
            ..Default::default()
        },
        inclusions: inclusions.map(str::to_string),
        exclusions: exclusions.map(str::to_string),
    }
}

fn registry(provisioner: &Arc<MockProvisioner>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("mock", MockProvider::constructor(provisioner.clone()));
    registry
}

fn harness(
    provisioner: &Arc<MockProvisioner>,
    accounting: &Arc<MockAccounting>,
    config: HarnessConfig,
) -> Arc<ConformanceHarness> {
    ConformanceHarness::init(config, registry(provisioner), accounting.clone())
        .expect("Failed to init harness")
}

/// A whole run: two suites share resources, API calls are audited, teardown releases
/// everything that was provisioned.
#[tokio::test]
async fn test_full_run() {
    let provisioner = Arc::new(MockProvisioner::new());
    let accounting = Arc::new(MockAccounting::new());
    let harness = harness(&provisioner, &accounting, config(None, None));
    assert_eq!(accounting.reports(), vec!["Init".to_string()]);

    let mut vm_suite = RunContext::open(&harness, "StatefulVMTests").expect("Failed to open");
    vm_suite.begin("stop");
    assert!(!vm_suite.is_test_skipped());
    accounting.record_call("launch", 1);
    accounting.record_call("getVirtualMachine", 3);
    let vm = vm_suite
        .resources()
        .compute()
        .vm_id(Label::Stateful, Some(VmState::Running), true, None)
        .await
        .expect("Failed to get vm");
    assert_eq!(vm.as_deref(), Some("vm-1"));
    let first = vm_suite.end();
    assert_eq!(first.name.as_deref(), Some("stop"));
    assert_eq!(first.total_calls, 4);
    assert_eq!(first.api_calls.get("getVirtualMachine"), Some(&3));

    let mut volume_suite = RunContext::open(&harness, "StatefulVolumeTests").expect("Failed to open");
    volume_suite.begin("attach");
    accounting.record_call("getVirtualMachine", 1);
    let shared_vm = volume_suite
        .resources()
        .compute()
        .vm_id(Label::Stateful, Some(VmState::Running), true, None)
        .await
        .expect("Failed to get vm");
    assert_eq!(shared_vm, vm);
    let volume = volume_suite
        .resources()
        .compute()
        .volume_id(Label::Stateful, true, None, None)
        .await
        .expect("Failed to get volume");
    assert_eq!(volume.as_deref(), Some("volume-1"));
    let second = volume_suite.end();
    assert_eq!(second.total_calls, 1);

    let audit = harness.api_audit().snapshot();
    assert_eq!(audit.get("getVirtualMachine"), Some(&4));
    assert_eq!(audit.get("launch"), Some(&1));
    assert_eq!(harness.api_audit().total(), 5);
    assert_eq!(provisioner.provision_count(ResourceKind::VirtualMachine), 1);

    vm_suite.close();
    volume_suite.close();
    let report = harness.cleanup().await;

    assert!(report.is_clean());
    assert_eq!(
        provisioner.releases(),
        vec![
            (ResourceKind::VirtualMachine, "vm-1".to_string()),
            (ResourceKind::Volume, "volume-1".to_string()),
        ]
    );
    assert_eq!(accounting.reports().last().map(String::as_str), Some("Clean Up"));
}

#[tokio::test]
async fn test_accounting_is_reported_around_each_test() {
    let provisioner = Arc::new(MockProvisioner::new());
    let accounting = Arc::new(MockAccounting::new());
    let harness = harness(&provisioner, &accounting, config(None, None));

    let mut ctx = RunContext::open(&harness, "KeypairTests").expect("Failed to open");
    ctx.begin("create");
    let prefix = ctx.prefix().to_string();
    assert!(prefix.starts_with("Acme/East.Keypair.create> "));
    ctx.end();

    assert_eq!(
        accounting.reports(),
        vec!["Init".to_string(), "Setup".to_string(), prefix]
    );
    assert_eq!(ctx.name(), None);
    assert!(ctx.prefix().starts_with("Acme/East.Keypair> "));
    harness.cleanup().await;
}

#[tokio::test]
async fn test_selection_rule_applies_to_contexts() {
    let provisioner = Arc::new(MockProvisioner::new());
    let accounting = Arc::new(MockAccounting::new());
    let harness = harness(
        &provisioner,
        &accounting,
        config(
            Some("StatelessVMTests,StatefulVMTests.stop"),
            Some("StatelessVMTests.listVirtualMachines"),
        ),
    );

    let mut stateless = RunContext::open(&harness, "StatelessVMTests").expect("Failed to open");
    stateless.begin("listVirtualMachines");
    assert!(stateless.is_test_skipped());
    stateless.end();
    stateless.begin("getVirtualMachine");
    assert!(!stateless.is_test_skipped());
    stateless.end();

    let mut stateful = RunContext::open(&harness, "statefulvmtests").expect("Failed to open");
    stateful.begin("STOP");
    assert!(!stateful.is_test_skipped());
    stateful.end();
    stateful.begin("start");
    assert!(stateful.is_test_skipped());
    stateful.end();

    let other = RunContext::open(&harness, "KeypairTests").expect("Failed to open");
    assert!(other.is_test_skipped());
    harness.cleanup().await;
}

#[tokio::test]
async fn test_teardown_survives_release_failures() {
    let provisioner = Arc::new(MockProvisioner::new());
    let accounting = Arc::new(MockAccounting::new());
    let harness = harness(&provisioner, &accounting, config(None, None));
    provisioner.fail_release("vm-1");

    let resources = harness.resources();
    resources
        .get_or_provision(ResourceKind::VirtualMachine, Label::custom("a"), Scope::any(), true)
        .await
        .expect("Failed to provision");
    resources
        .get_or_provision(ResourceKind::VirtualMachine, Label::custom("b"), Scope::any(), true)
        .await
        .expect("Failed to provision");
    resources
        .get_or_provision(ResourceKind::Subnet, Label::Removed, Scope::any(), true)
        .await
        .expect("Failed to provision");

    let report = harness.cleanup().await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.released.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].handle.id, "vm-1");
    assert_eq!(
        provisioner.releases(),
        vec![
            (ResourceKind::VirtualMachine, "vm-1".to_string()),
            (ResourceKind::VirtualMachine, "vm-2".to_string()),
            (ResourceKind::Subnet, "subnet-1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_provisioning_errors_reach_the_test() {
    let provisioner = Arc::new(MockProvisioner::new());
    provisioner
        .expect_provision(ResourceKind::Keypair)
        .return_err("key limit reached");
    let accounting = Arc::new(MockAccounting::new());
    let harness = harness(&provisioner, &accounting, config(None, None));

    let result = harness
        .resources()
        .identity()
        .keypair_id(Label::Stateful, true)
        .await;
    let err = result.expect_err("Provisioning should fail");
    assert!(err.to_string().contains("key limit reached"));

    let report = harness.cleanup().await;
    assert_eq!(report.attempted, 0);
    provisioner.verify();
}

#[tokio::test]
async fn test_missing_provider_class_is_fatal() {
    let provisioner = Arc::new(MockProvisioner::new());
    let mut config = config(None, None);
    config.provider.provider_class = None;

    let result = ConformanceHarness::init(
        config,
        registry(&provisioner),
        Arc::new(MockAccounting::new()),
    );
    assert!(matches!(result, Err(ConfigError::MissingProviderClass)));
}

#[tokio::test]
async fn test_context_requires_a_live_connection() {
    let provisioner = Arc::new(MockProvisioner::new());
    let mut registry = ProviderRegistry::new();
    registry.register("mock", MockProvider::offline_constructor(provisioner.clone()));
    let harness = ConformanceHarness::init(
        config(None, None),
        registry,
        Arc::new(MockAccounting::new()),
    )
    .expect("Failed to init harness");

    let result = RunContext::open(&harness, "StatelessVMTests");
    assert!(matches!(result, Err(ConfigError::ConnectionUnavailable(_))));
    harness.cleanup().await;
}

#[tokio::test]
async fn test_closed_context_loses_its_connection() {
    let provisioner = Arc::new(MockProvisioner::new());
    let accounting = Arc::new(MockAccounting::new());
    let harness = harness(&provisioner, &accounting, config(None, None));

    let ctx = RunContext::open(&harness, "StatelessDCTests").expect("Failed to open");
    assert_eq!(
        ctx.context().expect("Connected").provider_name.as_deref(),
        Some("Acme")
    );
    ctx.provider().close();
    assert!(matches!(ctx.context(), Err(ConfigError::ConnectionUnavailable(_))));
    ctx.close();
    harness.cleanup().await;
}
