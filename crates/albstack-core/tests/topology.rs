//! Topology builder scenarios.
//!
//! Exercises the public API end to end: deployment file → request → topology.

use albstack_core::*;

fn orders_request() -> DeploymentRequest {
    DeploymentRequest {
        stack_name: "Orders".to_string(),
        network: NetworkRef::new("vpc-0abc"),
        cluster: ClusterRef::new("orders-cluster"),
        infra_version: "1.4.0".to_string(),
        container_port: 8080,
    }
}

#[test]
fn orders_scenario_derives_expected_names() {
    let topo = build_topology(&orders_request());

    assert_eq!(topo.table.name, "Orders-DataTable");
    assert_eq!(topo.identity.name, "OrdersRole");
    assert_eq!(topo.service.container_name, "OrdersContainer");
    assert_eq!(topo.service.logging.stream_prefix, "OrdersLog");
    assert_eq!(topo.service.environment["PORT_IN"], "8080");
}

#[test]
fn same_stack_name_collides_in_names_only() {
    let a = orders_request();
    let mut b = orders_request();
    b.infra_version = "9.9.9".to_string();
    b.container_port = 9000;
    b.cluster = ClusterRef::new("other");

    let ta = build_topology(&a);
    let tb = build_topology(&b);

    assert_eq!(ta.table.name, tb.table.name);
    assert_eq!(ta.identity.name, tb.identity.name);
    assert_eq!(ta.service.container_name, tb.service.container_name);
    assert_eq!(ta.service.logging.stream_prefix, tb.service.logging.stream_prefix);
    assert_ne!(ta.service.environment, tb.service.environment);
}

#[test]
fn building_twice_is_identical() {
    let req = orders_request();
    assert_eq!(build_topology(&req), build_topology(&req));
}

#[test]
fn request_is_carried_unchanged() {
    let req = orders_request();
    let topo = build_topology(&req);
    assert_eq!(topo.request, req);
    assert_eq!(topo.service.cluster, req.cluster);
    assert_eq!(topo.service.network, req.network);
}

#[test]
fn deployment_file_builds_topology() {
    let config: DeployConfig = toml::from_str(
        r#"
[stack]
name = "Billing"
infra_version = "3.1.0"
container_port = 5000

[network]
vpc_id = "vpc-9"

[cluster]
name = "shared"
"#,
    )
    .unwrap();

    let topo = build_topology(&config.to_request());
    assert_eq!(topo.table.name, "Billing-DataTable");
    assert_eq!(topo.service.environment["APP_NAME"], "Billing");
    assert_eq!(topo.service.environment["INFRA_VERSION"], "3.1.0");
    assert_eq!(topo.load_balancer.target_port, 5000);
}
