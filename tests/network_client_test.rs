use async_trait::async_trait;
use conformance_coordinator::clients::MAX_SCOPE_RETRIES;
use conformance_coordinator::framework::mock::MockProvisioner;
use conformance_coordinator::framework::{
    FirewallSupport, FrameworkError, ProvisionError, ResourceProvisioner,
};
use conformance_coordinator::lifecycle::SharedResourceManager;
use conformance_coordinator::model::{IpVersion, Label, ResourceKind, Scope};
use parking_lot::Mutex;
use std::sync::Arc;

/// A cloud that can only create and delete, with no placement or capability queries.
#[derive(Default)]
struct CreateDeleteOnly {
    provisioned: Mutex<Vec<String>>,
}

#[async_trait]
impl ResourceProvisioner for CreateDeleteOnly {
    async fn provision(
        &self,
        kind: ResourceKind,
        _label: &Label,
        _scope: &Scope,
    ) -> Result<String, ProvisionError> {
        let mut provisioned = self.provisioned.lock();
        let id = format!("{}-{}", kind, provisioned.len() + 1);
        provisioned.push(id.clone());
        Ok(id)
    }

    async fn release(&self, _kind: ResourceKind, _id: &str) -> Result<(), ProvisionError> {
        Ok(())
    }
}

fn start() -> (Arc<MockProvisioner>, SharedResourceManager) {
    let provisioner = Arc::new(MockProvisioner::new());
    let resources = SharedResourceManager::start(provisioner.clone());
    (provisioner, resources)
}

fn labels(provisioner: &MockProvisioner, kind: ResourceKind) -> Vec<String> {
    provisioner
        .provisions()
        .into_iter()
        .filter(|(k, _, _)| *k == kind)
        .map(|(_, label, _)| label.to_string())
        .collect()
}

#[tokio::test]
async fn test_vlan_firewall_in_requested_vlan() {
    let (provisioner, resources) = start();

    let id = resources
        .network()
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-7".into()))
        .await
        .expect("Lookup failed");

    assert_eq!(id.as_deref(), Some("firewall-1"));
    let (_, _, scope) = provisioner.provisions().remove(0);
    assert_eq!(scope.network.as_deref(), Some("vlan-7"));
    resources.close().await;
}

/// A firewall that lands in the wrong VLAN is replaced by one under a derived label.
#[tokio::test]
async fn test_misplaced_firewall_is_retried_under_derived_label() {
    let (provisioner, resources) = start();
    provisioner
        .expect_provision(ResourceKind::Firewall)
        .return_ok("fw-stray");
    provisioner.place("fw-stray", Some("vlan-elsewhere"));

    let id = resources
        .network()
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-7".into()))
        .await
        .expect("Lookup failed");

    assert_eq!(id.as_deref(), Some("firewall-1"));
    assert_eq!(
        labels(&provisioner, ResourceKind::Firewall),
        vec!["stateful", "statefula"]
    );
    provisioner.verify();

    // Both firewalls are owned and released.
    let report = resources.close().await;
    assert_eq!(report.attempted, 2);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let (provisioner, resources) = start();
    for n in 0..=MAX_SCOPE_RETRIES {
        let id = format!("fw-stray-{n}");
        provisioner
            .expect_provision(ResourceKind::Firewall)
            .return_ok(id.clone());
        provisioner.place(id, Some("vlan-elsewhere"));
    }

    let result = resources
        .network()
        .vlan_firewall_id(Label::custom("edge"), true, Some("vlan-7".into()))
        .await;

    match result {
        Err(FrameworkError::ScopeMismatch {
            kind,
            label,
            network,
            attempts,
        }) => {
            assert_eq!(kind, ResourceKind::Firewall);
            assert_eq!(label, Label::custom("edge"));
            assert_eq!(network, "vlan-7");
            assert_eq!(attempts, MAX_SCOPE_RETRIES + 1);
        }
        other => panic!("expected ScopeMismatch, got {:?}", other),
    }
    assert_eq!(
        labels(&provisioner, ResourceKind::Firewall),
        vec!["edge", "edgea", "edgeaa", "edgeaaa"]
    );
    resources.close().await;
}

#[tokio::test]
async fn test_vlan_is_resolved_when_not_given() {
    let (provisioner, resources) = start();

    let id = resources
        .network()
        .vlan_firewall_id(Label::custom("rules"), true, None)
        .await
        .expect("Lookup failed");

    assert_eq!(id.as_deref(), Some("firewall-1"));
    assert_eq!(labels(&provisioner, ResourceKind::Vlan), vec!["stateful"]);
    let vlan = resources
        .network()
        .vlan_id(Label::Stateful, false, None)
        .await
        .expect("Lookup failed");
    assert_eq!(vlan.as_deref(), Some("vlan-1"));
    resources.close().await;
}

#[tokio::test]
async fn test_stateless_firewall_without_stateless_vlan_is_absent() {
    let (provisioner, resources) = start();

    let id = resources
        .network()
        .vlan_firewall_id(Label::Stateless, true, None)
        .await
        .expect("Lookup failed");

    assert_eq!(id, None);
    assert!(provisioner.provisions().is_empty());
    resources.close().await;
}

#[tokio::test]
async fn test_vanished_firewall_reads_as_absent() {
    let (provisioner, resources) = start();
    let network = resources.network();

    let id = network
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-7".into()))
        .await
        .expect("Lookup failed")
        .expect("Firewall provisioned");
    provisioner
        .release(ResourceKind::Firewall, &id)
        .await
        .expect("Release failed");

    let again = network
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-7".into()))
        .await
        .expect("Lookup failed");
    assert_eq!(again, None);
    resources.close().await;
}

/// Clouds that cannot report placement get the first firewall, not a retry storm.
#[tokio::test]
async fn test_cloud_without_placement_keeps_first_firewall() {
    let provisioner = Arc::new(CreateDeleteOnly::default());
    let resources = SharedResourceManager::start(provisioner.clone());

    let id = resources
        .network()
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-1".into()))
        .await
        .expect("Lookup failed");

    assert_eq!(id.as_deref(), Some("firewall-1"));
    assert_eq!(provisioner.provisioned.lock().len(), 1);
    assert_eq!(resources.compute().vm_product_id().await, None);
    let report = resources.close().await;
    assert_eq!(report.attempted, 1);
}

#[tokio::test]
async fn test_placement_without_network_is_not_a_mismatch() {
    let (provisioner, resources) = start();
    provisioner
        .expect_provision(ResourceKind::Firewall)
        .return_ok("fw-unplaced");
    provisioner.place("fw-unplaced", None);

    let id = resources
        .network()
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-7".into()))
        .await
        .expect("Lookup failed");

    assert_eq!(id.as_deref(), Some("fw-unplaced"));
    assert_eq!(provisioner.provision_count(ResourceKind::Firewall), 1);
    resources.close().await;
}

#[tokio::test]
async fn test_unreadable_placement_returns_id_unchecked() {
    let (provisioner, resources) = start();
    provisioner.fail_locate();

    let id = resources
        .network()
        .vlan_firewall_id(Label::Stateful, true, Some("vlan-7".into()))
        .await
        .expect("Lookup failed");
    assert_eq!(id.as_deref(), Some("firewall-1"));
    resources.close().await;
}

#[tokio::test]
async fn test_any_firewall_follows_capabilities() {
    let (provisioner, resources) = start();
    let network = resources.network();

    // Default support: not subscribed.
    assert_eq!(network.any_firewall_id(Label::Stateful, true).await.unwrap(), None);

    provisioner.fail_firewall_support();
    assert_eq!(network.any_firewall_id(Label::Stateful, true).await.unwrap(), None);
    assert!(provisioner.provisions().is_empty());

    provisioner.set_firewall_support(FirewallSupport {
        subscribed: true,
        general: true,
        vlan: true,
    });
    let general = network.any_firewall_id(Label::Stateful, true).await.unwrap();
    assert_eq!(general.as_deref(), Some("firewall-1"));
    let (_, _, scope) = provisioner.provisions().remove(0);
    assert_eq!(scope.network, None);

    resources.close().await;
}

#[tokio::test]
async fn test_vlan_only_clouds_get_a_removed_vlan_firewall() {
    let (provisioner, resources) = start();
    provisioner.set_firewall_support(FirewallSupport {
        subscribed: true,
        general: false,
        vlan: true,
    });

    let id = resources
        .network()
        .any_firewall_id(Label::custom("ignored"), false)
        .await
        .expect("Lookup failed");

    assert_eq!(id.as_deref(), Some("firewall-1"));
    assert_eq!(labels(&provisioner, ResourceKind::Vlan), vec!["stateful"]);
    assert_eq!(labels(&provisioner, ResourceKind::Firewall), vec!["removed"]);
    resources.close().await;
}

#[tokio::test]
async fn test_subnets_and_static_ips_are_scoped() {
    let (provisioner, resources) = start();
    let network = resources.network();

    let a = network
        .subnet_id(Label::Stateful, true, Some("vlan-1".into()), None)
        .await
        .unwrap();
    let b = network
        .subnet_id(Label::Stateful, true, Some("vlan-2".into()), None)
        .await
        .unwrap();
    assert_ne!(a, b);

    let v4 = network
        .static_ip_id(Label::Stateful, true, Some(IpVersion::Ipv4))
        .await
        .unwrap();
    let v6 = network
        .static_ip_id(Label::Stateful, true, Some(IpVersion::Ipv6))
        .await
        .unwrap();
    let v4_again = network
        .static_ip_id(Label::Stateful, false, Some(IpVersion::Ipv4))
        .await
        .unwrap();
    assert_ne!(v4, v6);
    assert_eq!(v4, v4_again);
    assert_eq!(provisioner.provision_count(ResourceKind::StaticIp), 2);
    resources.close().await;
}

#[tokio::test]
async fn test_default_data_center_query() {
    let (provisioner, resources) = start();
    assert_eq!(resources.compute().default_data_center(true).await, None);

    provisioner.set_default_data_center("dc-east-1a");
    assert_eq!(
        resources.compute().default_data_center(false).await.as_deref(),
        Some("dc-east-1a")
    );
    resources.close().await;
}

#[tokio::test]
async fn test_product_queries() {
    let (provisioner, resources) = start();
    assert_eq!(resources.compute().vm_product_id().await, None);
    assert_eq!(resources.compute().volume_product_id().await, None);

    provisioner.set_product(ResourceKind::VirtualMachine, "m1.small");
    provisioner.set_product(ResourceKind::Volume, "gp2");
    assert_eq!(
        resources.compute().vm_product_id().await.as_deref(),
        Some("m1.small")
    );
    assert_eq!(
        resources.compute().volume_product_id().await.as_deref(),
        Some("gp2")
    );
    resources.close().await;
}
