//! Topology builder.
//!
//! A pure function from [`DeploymentRequest`] to [`Topology`]. There is one
//! construction path and no validation here; names the engine would reject
//! are reported by the synthesizer.

use std::collections::BTreeMap;

use tracing::debug;

use crate::naming;
use crate::types::*;

/// Public sample image the service runs.
pub const SAMPLE_IMAGE: &str = "amazon/amazon-ecs-sample";
/// Value of `CONTAINER_SERVICE` in the container environment.
pub const CONTAINER_SERVICE: &str = "AWS ECS";
/// Principal trusted to assume the execution role.
pub const TASK_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";

pub const TASK_CPU: u32 = 512;
pub const TASK_MEMORY_MIB: u32 = 1024;
pub const DESIRED_COUNT: u32 = 2;

pub const LISTENER_PORT: u16 = 80;
pub const HEALTH_CHECK_PATH: &str = "/";

/// Actions granted to the execution role, over resource `*`.
///
/// `dynamodb:*` is wider than the task needs. It is kept as-is because
/// narrowing it changes what deployed workloads may do.
pub const EXECUTION_ACTIONS: [&str; 7] = [
    "ecr:GetAuthorizationToken",
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
    "dynamodb:*",
];

pub fn build_table(stack_name: &str) -> DataTable {
    DataTable {
        logical_id: "DataTable".to_string(),
        name: naming::table_name(stack_name),
        partition_key: KeyAttribute {
            name: "id".to_string(),
            attribute_type: AttributeType::String,
        },
        removal_policy: RemovalPolicy::Destroy,
    }
}

pub fn build_execution_identity(stack_name: &str) -> ExecutionIdentity {
    ExecutionIdentity {
        logical_id: "ExecutionRole".to_string(),
        name: naming::role_name(stack_name),
        trusted_principal: TASK_PRINCIPAL.to_string(),
        statements: vec![PolicyStatement {
            effect: Effect::Allow,
            actions: EXECUTION_ACTIONS.iter().map(|a| a.to_string()).collect(),
            resources: vec!["*".to_string()],
        }],
    }
}

/// Wire the service and its load balancer.
///
/// Rollback on failed health checks is always on. It is a switch for the
/// engine's deployment controller; nothing here tracks task health.
pub fn build_container_service(
    request: &DeploymentRequest,
    table: &DataTable,
    identity: &ExecutionIdentity,
) -> (ContainerService, LoadBalancer) {
    let mut environment = BTreeMap::new();
    environment.insert("APP_NAME".to_string(), request.stack_name.clone());
    environment.insert("INFRA_VERSION".to_string(), request.infra_version.clone());
    environment.insert("CONTAINER_SERVICE".to_string(), CONTAINER_SERVICE.to_string());
    environment.insert("TABLE_NAME".to_string(), table.name.clone());
    environment.insert("PORT_IN".to_string(), request.container_port.to_string());

    let service = ContainerService {
        logical_id: "Service".to_string(),
        cluster: request.cluster.clone(),
        network: request.network.clone(),
        container_name: naming::container_name(&request.stack_name),
        image: SAMPLE_IMAGE.to_string(),
        cpu: TASK_CPU,
        memory_mib: TASK_MEMORY_MIB,
        desired_count: DESIRED_COUNT,
        container_port: request.container_port,
        environment,
        logging: LogConfig {
            enabled: true,
            stream_prefix: naming::log_stream_prefix(&request.stack_name),
        },
        execution_role: identity.name.clone(),
        circuit_breaker: CircuitBreaker { rollback: true },
        min_healthy_percent: 50,
        max_healthy_percent: 200,
    };

    let load_balancer = LoadBalancer {
        logical_id: "LoadBalancer".to_string(),
        public: true,
        listener_port: LISTENER_PORT,
        target_port: request.container_port,
        health_check_path: HEALTH_CHECK_PATH.to_string(),
    };

    (service, load_balancer)
}

/// Build the full description for `request`.
pub fn build_topology(request: &DeploymentRequest) -> Topology {
    debug!(stack = %request.stack_name, "building topology");

    let table = build_table(&request.stack_name);
    let identity = build_execution_identity(&request.stack_name);
    let (service, load_balancer) = build_container_service(request, &table, &identity);

    debug!(
        table = %table.name,
        role = %identity.name,
        container = %service.container_name,
        "topology built"
    );

    Topology {
        request: request.clone(),
        table,
        identity,
        service,
        load_balancer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(stack: &str, port: u16) -> DeploymentRequest {
        DeploymentRequest {
            stack_name: stack.to_string(),
            network: NetworkRef::new("vpc-123"),
            cluster: ClusterRef::new("main"),
            infra_version: "2.0.1".to_string(),
            container_port: port,
        }
    }

    #[test]
    fn table_has_string_id_key_and_is_destroyed() {
        let table = build_table("Orders");
        assert_eq!(table.name, "Orders-DataTable");
        assert_eq!(table.partition_key.name, "id");
        assert_eq!(table.partition_key.attribute_type, AttributeType::String);
        assert_eq!(table.removal_policy, RemovalPolicy::Destroy);
    }

    #[test]
    fn identity_grants_exactly_the_fixed_actions() {
        for stack in ["Orders", "x", ""] {
            let identity = build_execution_identity(stack);
            let actions: Vec<&str> = identity.actions().collect();
            assert_eq!(actions, EXECUTION_ACTIONS.to_vec());
            assert_eq!(identity.statements.len(), 1);
            assert_eq!(identity.statements[0].effect, Effect::Allow);
            assert_eq!(identity.statements[0].resources, vec!["*".to_string()]);
            assert_eq!(identity.trusted_principal, "ecs-tasks.amazonaws.com");
        }
    }

    #[test]
    fn environment_is_taken_from_request_and_table() {
        let req = request("Orders", 8080);
        let table = build_table(&req.stack_name);
        let identity = build_execution_identity(&req.stack_name);
        let (service, _) = build_container_service(&req, &table, &identity);

        let env = &service.environment;
        assert_eq!(env.len(), 5);
        assert_eq!(env["APP_NAME"], "Orders");
        assert_eq!(env["INFRA_VERSION"], "2.0.1");
        assert_eq!(env["CONTAINER_SERVICE"], "AWS ECS");
        assert_eq!(env["TABLE_NAME"], "Orders-DataTable");
        assert_eq!(env["PORT_IN"], "8080");
    }

    #[test]
    fn sizing_and_rollback_ignore_input() {
        for port in [1, 80, 8080, 65535] {
            let topo = build_topology(&request("Svc", port));
            assert_eq!(topo.service.cpu, 512);
            assert_eq!(topo.service.memory_mib, 1024);
            assert_eq!(topo.service.desired_count, 2);
            assert!(topo.service.circuit_breaker.rollback);
            assert!(topo.service.logging.enabled);
        }
    }

    #[test]
    fn identity_is_bound_as_execution_role() {
        let topo = build_topology(&request("Orders", 8080));
        assert_eq!(topo.service.execution_role, topo.identity.name);
        assert_eq!(topo.service.execution_role, "OrdersRole");
    }

    #[test]
    fn load_balancer_targets_container_port() {
        let topo = build_topology(&request("Orders", 3000));
        assert_eq!(topo.load_balancer.listener_port, 80);
        assert_eq!(topo.load_balancer.target_port, 3000);
        assert!(topo.load_balancer.public);
    }
}
