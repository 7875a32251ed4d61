//! Desired-state records shared across albstack crates.
//!
//! Every type here is a plain value. Nothing is mutated after the builder
//! returns it; the provisioning engine owns everything that happens next.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque handle to the caller-supplied network (VPC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRef {
    pub vpc_id: String,
    /// Subnets the service tasks are placed in. Empty means "let the
    /// engine pick the network's private subnets".
    #[serde(default)]
    pub subnets: Vec<String>,
}

impl NetworkRef {
    pub fn new(vpc_id: impl Into<String>) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            subnets: Vec::new(),
        }
    }
}

/// Opaque handle to the caller-supplied container cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRef {
    pub name: String,
}

impl ClusterRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ── Request ───────────────────────────────────────────────────────

/// Everything the builder needs to describe one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    /// Unique identifier, also the prefix of every derived name.
    pub stack_name: String,
    pub network: NetworkRef,
    pub cluster: ClusterRef,
    /// Passed verbatim to the container as `INFRA_VERSION`.
    pub infra_version: String,
    pub container_port: u16,
}

// ── Table ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    String,
}

impl AttributeType {
    /// Single-letter code used by the table API.
    pub fn code(&self) -> &'static str {
        match self {
            AttributeType::String => "S",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// What the engine does with a resource when the stack is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

impl RemovalPolicy {
    pub fn deletion_policy(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
        }
    }
}

/// Managed key-value table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub logical_id: String,
    pub name: String,
    pub partition_key: KeyAttribute,
    /// Always `Destroy`: table data does not survive stack removal.
    pub removal_policy: RemovalPolicy,
}

// ── Identity ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    /// True when any action or resource is an unscoped wildcard.
    pub fn is_over_broad(&self) -> bool {
        self.resources.iter().any(|r| r == "*")
            || self.actions.iter().any(|a| a == "*" || a.ends_with(":*"))
    }
}

/// Role assumed by the task runtime to pull images and ship logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionIdentity {
    pub logical_id: String,
    pub name: String,
    pub trusted_principal: String,
    pub statements: Vec<PolicyStatement>,
}

impl ExecutionIdentity {
    /// Every action granted across all statements, in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.statements
            .iter()
            .flat_map(|s| s.actions.iter().map(String::as_str))
    }
}

// ── Service ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub enabled: bool,
    pub stream_prefix: String,
}

/// Deployment circuit breaker handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    pub rollback: bool,
}

/// Fargate service running the sample container behind the balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerService {
    pub logical_id: String,
    pub cluster: ClusterRef,
    pub network: NetworkRef,
    pub container_name: String,
    pub image: String,
    /// CPU units (1024 = one vCPU).
    pub cpu: u32,
    pub memory_mib: u32,
    pub desired_count: u32,
    pub container_port: u16,
    /// Sorted so rendering is deterministic.
    pub environment: BTreeMap<String, String>,
    pub logging: LogConfig,
    /// Name of the role bound as the execution credential.
    pub execution_role: String,
    pub circuit_breaker: CircuitBreaker,
    pub min_healthy_percent: u32,
    pub max_healthy_percent: u32,
}

/// Internet-facing application load balancer created alongside the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub logical_id: String,
    pub public: bool,
    pub listener_port: u16,
    /// Port traffic is forwarded to on each task.
    pub target_port: u16,
    pub health_check_path: String,
}

/// Complete desired-state description for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub request: DeploymentRequest,
    pub table: DataTable,
    pub identity: ExecutionIdentity,
    pub service: ContainerService,
    pub load_balancer: LoadBalancer,
}
