use conformance_coordinator::config::HarnessConfig;
use conformance_coordinator::framework::mock::{MockAccounting, MockProvider, MockProvisioner};
use conformance_coordinator::framework::FirewallSupport;
use conformance_coordinator::lifecycle::{setup_tracing, ConformanceHarness, RunContext};
use conformance_coordinator::model::{Label, ResourceKind, VmState};
use conformance_coordinator::provider::ProviderRegistry;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let provisioner = Arc::new(MockProvisioner::new());
    provisioner.with_existing(ResourceKind::VirtualMachine, "vm-public");
    provisioner.set_firewall_support(FirewallSupport {
        subscribed: true,
        general: false,
        vlan: true,
    });

    let mut registry = ProviderRegistry::new();
    registry.register("mock", MockProvider::constructor(provisioner.clone()));

    let mut config = HarnessConfig::from_env()?;
    config.provider.provider_class.get_or_insert_with(|| "mock".to_string());

    let accounting = Arc::new(MockAccounting::new());
    let harness = ConformanceHarness::init(config, registry, accounting.clone())?;

    async {
        let mut ctx = RunContext::open(&harness, "StatelessVMTests")?;
        ctx.begin("listVirtualMachines");
        if !ctx.is_test_skipped() {
            accounting.record_call("listVirtualMachines", 1);
            let vm = ctx
                .resources()
                .compute()
                .vm_id(Label::Stateless, None, false, None)
                .await?;
            ctx.out_kv("Virtual machine", vm.as_deref().unwrap_or("none"));
            ctx.ok("Listed virtual machines");
        }
        ctx.end();
        ctx.close();
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(info_span!("stateless_vm"))
    .await?;

    async {
        let mut ctx = RunContext::open(&harness, "StatefulVMTests")?;
        for test in ["stop", "start"] {
            ctx.begin(test);
            if ctx.is_test_skipped() {
                ctx.end();
                continue;
            }
            accounting.record_call("launch", 1);
            accounting.record_call("getVirtualMachine", 2);
            let vm = ctx
                .resources()
                .compute()
                .vm_id(Label::Stateful, Some(VmState::Running), true, None)
                .await?;
            ctx.out_kv("Virtual machine", vm.as_deref().unwrap_or("none"));
            ctx.end();
        }
        ctx.close();
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(info_span!("stateful_vm"))
    .await?;

    async {
        let mut ctx = RunContext::open(&harness, "StatefulFirewallTests")?;
        ctx.begin("createVLANFirewall");
        if !ctx.is_test_skipped() {
            match ctx
                .resources()
                .network()
                .any_firewall_id(Label::Stateful, true)
                .await?
            {
                Some(id) => ctx.out_kv("Firewall", id),
                None => ctx.warn("No firewall support in this cloud"),
            }
        }
        ctx.end();
        ctx.close();
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(info_span!("firewall"))
    .await?;

    let report = harness.cleanup().await;
    for (call, count) in harness.api_audit().snapshot() {
        info!(%call, count, "Audit");
    }
    info!(
        total_calls = harness.api_audit().total(),
        released = report.released.len(),
        failed = report.failures.len(),
        reports = accounting.reports().len(),
        "Run complete"
    );
    Ok(())
}
