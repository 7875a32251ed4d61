//! Template rendering.
//!
//! Turns a [`Topology`] into the document the provisioning engine consumes.
//! Maps are `BTreeMap` and `serde_json::Map` (sorted), so the same topology
//! always renders to the same bytes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use albstack_core::{
    ContainerService, DataTable, ExecutionIdentity, LoadBalancer, RemovalPolicy, Topology,
};

use crate::error::SynthResult;

pub const FORMAT_VERSION: &str = "2010-09-09";
pub const POLICY_VERSION: &str = "2012-10-17";

/// Parameter supplied at deploy time when the network carries no subnets.
pub const SUBNETS_PARAMETER: &str = "SubnetIds";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,
    #[serde(rename = "Outputs")]
    pub outputs: BTreeMap<String, Output>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub param_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

impl Resource {
    fn new(resource_type: &str, properties: Value) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub description: String,
    pub value: Value,
}

impl Template {
    pub fn to_json_pretty(&self) -> SynthResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the pretty-printed template, hex encoded.
    pub fn digest(&self) -> SynthResult<String> {
        let json = self.to_json_pretty()?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }
}

fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

fn assume_role_policy(principal: &str) -> Value {
    json!({
        "Version": POLICY_VERSION,
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": principal }
        }]
    })
}

/// A single item renders as a scalar, the way the provider emits it.
fn scalar_or_list(items: &[String]) -> Value {
    match items {
        [one] => json!(one),
        many => json!(many),
    }
}

// Logical ids for the resources the pattern creates besides the four
// entities carried by the topology.
const EXECUTION_POLICY: &str = "ExecutionRoleDefaultPolicy";
const TASK_ROLE: &str = "TaskRole";
const TASK_DEFINITION: &str = "TaskDefinition";
const LOG_GROUP: &str = "LogGroup";
const LB_SECURITY_GROUP: &str = "LoadBalancerSecurityGroup";
const SERVICE_SECURITY_GROUP: &str = "ServiceSecurityGroup";
const LISTENER: &str = "PublicListener";
const TARGET_GROUP: &str = "TargetGroup";

/// Render without validating. Callers normally go through [`crate::synthesize`].
pub fn render(topology: &Topology) -> Template {
    let mut parameters = BTreeMap::new();
    let subnets = if topology.request.network.subnets.is_empty() {
        parameters.insert(
            SUBNETS_PARAMETER.to_string(),
            Parameter {
                param_type: "List<AWS::EC2::Subnet::Id>".to_string(),
                description: format!("Subnets in {}", topology.request.network.vpc_id),
            },
        );
        reference(SUBNETS_PARAMETER)
    } else {
        json!(topology.request.network.subnets)
    };

    let mut resources = BTreeMap::new();
    render_table(&topology.table, &mut resources);
    render_identity(&topology.identity, &mut resources);
    render_load_balancer(topology, &subnets, &mut resources);
    render_service(topology, &subnets, &mut resources);

    let lb = &topology.load_balancer.logical_id;
    let mut outputs = BTreeMap::new();
    outputs.insert(
        "LoadBalancerDNS".to_string(),
        Output {
            description: "Public DNS name of the load balancer".to_string(),
            value: get_att(lb, "DNSName"),
        },
    );
    outputs.insert(
        "ServiceURL".to_string(),
        Output {
            description: "URL routed to the container service".to_string(),
            value: json!({ "Fn::Join": ["", ["http://", get_att(lb, "DNSName")]] }),
        },
    );
    outputs.insert(
        "TableName".to_string(),
        Output {
            description: "Name of the data table".to_string(),
            value: reference(&topology.table.logical_id),
        },
    );

    Template {
        format_version: FORMAT_VERSION.to_string(),
        description: format!(
            "{} load-balanced container service (infra {})",
            topology.request.stack_name, topology.request.infra_version
        ),
        parameters,
        resources,
        outputs,
    }
}

fn render_table(table: &DataTable, resources: &mut BTreeMap<String, Resource>) {
    let key = &table.partition_key;
    let mut resource = Resource::new(
        "AWS::DynamoDB::Table",
        json!({
            "TableName": table.name,
            "KeySchema": [{ "AttributeName": key.name, "KeyType": "HASH" }],
            "AttributeDefinitions": [{
                "AttributeName": key.name,
                "AttributeType": key.attribute_type.code()
            }],
            "ProvisionedThroughput": { "ReadCapacityUnits": 5, "WriteCapacityUnits": 5 }
        }),
    );
    let policy = table.removal_policy.deletion_policy().to_string();
    resource.deletion_policy = Some(policy.clone());
    resource.update_replace_policy = Some(policy);
    resources.insert(table.logical_id.clone(), resource);
}

fn render_identity(identity: &ExecutionIdentity, resources: &mut BTreeMap<String, Resource>) {
    resources.insert(
        identity.logical_id.clone(),
        Resource::new(
            "AWS::IAM::Role",
            json!({
                "RoleName": identity.name,
                "AssumeRolePolicyDocument": assume_role_policy(&identity.trusted_principal)
            }),
        ),
    );

    let statements: Vec<Value> = identity
        .statements
        .iter()
        .map(|s| {
            json!({
                "Effect": s.effect.as_str(),
                "Action": scalar_or_list(&s.actions),
                "Resource": scalar_or_list(&s.resources)
            })
        })
        .collect();
    resources.insert(
        EXECUTION_POLICY.to_string(),
        Resource::new(
            "AWS::IAM::Policy",
            json!({
                "PolicyName": EXECUTION_POLICY,
                "PolicyDocument": { "Version": POLICY_VERSION, "Statement": statements },
                "Roles": [reference(&identity.logical_id)]
            }),
        ),
    );

    // Task role for the workload itself; the pattern always creates one,
    // with no statements attached.
    resources.insert(
        TASK_ROLE.to_string(),
        Resource::new(
            "AWS::IAM::Role",
            json!({ "AssumeRolePolicyDocument": assume_role_policy(&identity.trusted_principal) }),
        ),
    );
}

fn render_load_balancer(
    topology: &Topology,
    subnets: &Value,
    resources: &mut BTreeMap<String, Resource>,
) {
    let lb: &LoadBalancer = &topology.load_balancer;
    let vpc_id = &topology.request.network.vpc_id;
    let scheme = if lb.public { "internet-facing" } else { "internal" };

    resources.insert(
        LB_SECURITY_GROUP.to_string(),
        Resource::new(
            "AWS::EC2::SecurityGroup",
            json!({
                "GroupDescription": format!("{} load balancer", topology.request.stack_name),
                "VpcId": vpc_id,
                "SecurityGroupIngress": [{
                    "CidrIp": "0.0.0.0/0",
                    "IpProtocol": "tcp",
                    "FromPort": lb.listener_port,
                    "ToPort": lb.listener_port
                }]
            }),
        ),
    );

    resources.insert(
        lb.logical_id.clone(),
        Resource::new(
            "AWS::ElasticLoadBalancingV2::LoadBalancer",
            json!({
                "Type": "application",
                "Scheme": scheme,
                "SecurityGroups": [get_att(LB_SECURITY_GROUP, "GroupId")],
                "Subnets": subnets
            }),
        ),
    );

    resources.insert(
        TARGET_GROUP.to_string(),
        Resource::new(
            "AWS::ElasticLoadBalancingV2::TargetGroup",
            json!({
                "Port": lb.target_port,
                "Protocol": "HTTP",
                "TargetType": "ip",
                "VpcId": vpc_id,
                "HealthCheckPath": lb.health_check_path
            }),
        ),
    );

    resources.insert(
        LISTENER.to_string(),
        Resource::new(
            "AWS::ElasticLoadBalancingV2::Listener",
            json!({
                "LoadBalancerArn": reference(&lb.logical_id),
                "Port": lb.listener_port,
                "Protocol": "HTTP",
                "DefaultActions": [{ "Type": "forward", "TargetGroupArn": reference(TARGET_GROUP) }]
            }),
        ),
    );
}

fn render_service(topology: &Topology, subnets: &Value, resources: &mut BTreeMap<String, Resource>) {
    let service: &ContainerService = &topology.service;

    let log_policy = RemovalPolicy::Retain.deletion_policy().to_string();
    resources.insert(
        LOG_GROUP.to_string(),
        Resource {
            deletion_policy: Some(log_policy.clone()),
            update_replace_policy: Some(log_policy),
            ..Resource::new("AWS::Logs::LogGroup", json!({}))
        },
    );

    let environment: Vec<Value> = service
        .environment
        .iter()
        .map(|(name, value)| json!({ "Name": name, "Value": value }))
        .collect();

    let mut container = json!({
        "Name": service.container_name,
        "Image": service.image,
        "Essential": true,
        "PortMappings": [{ "ContainerPort": service.container_port, "Protocol": "tcp" }],
        "Environment": environment
    });
    if service.logging.enabled {
        container["LogConfiguration"] = json!({
            "LogDriver": "awslogs",
            "Options": {
                "awslogs-group": reference(LOG_GROUP),
                "awslogs-stream-prefix": service.logging.stream_prefix,
                "awslogs-region": reference("AWS::Region")
            }
        });
    }

    resources.insert(
        TASK_DEFINITION.to_string(),
        Resource::new(
            "AWS::ECS::TaskDefinition",
            json!({
                "ContainerDefinitions": [container],
                "Cpu": service.cpu.to_string(),
                "Memory": service.memory_mib.to_string(),
                "NetworkMode": "awsvpc",
                "RequiresCompatibilities": ["FARGATE"],
                "ExecutionRoleArn": get_att(&topology.identity.logical_id, "Arn"),
                "TaskRoleArn": get_att(TASK_ROLE, "Arn")
            }),
        ),
    );

    resources.insert(
        SERVICE_SECURITY_GROUP.to_string(),
        Resource::new(
            "AWS::EC2::SecurityGroup",
            json!({
                "GroupDescription": format!("{} service", topology.request.stack_name),
                "VpcId": topology.request.network.vpc_id,
                "SecurityGroupIngress": [{
                    "IpProtocol": "tcp",
                    "FromPort": service.container_port,
                    "ToPort": service.container_port,
                    "SourceSecurityGroupId": get_att(LB_SECURITY_GROUP, "GroupId")
                }]
            }),
        ),
    );

    let mut resource = Resource::new(
        "AWS::ECS::Service",
        json!({
            "Cluster": service.cluster.name,
            "LaunchType": "FARGATE",
            "DesiredCount": service.desired_count,
            "TaskDefinition": reference(TASK_DEFINITION),
            "HealthCheckGracePeriodSeconds": 60,
            "DeploymentConfiguration": {
                "MinimumHealthyPercent": service.min_healthy_percent,
                "MaximumPercent": service.max_healthy_percent,
                // The pattern always enables the breaker once one is
                // configured; only rollback is carried on the service.
                "DeploymentCircuitBreaker": {
                    "Enable": true,
                    "Rollback": service.circuit_breaker.rollback
                }
            },
            "LoadBalancers": [{
                "ContainerName": service.container_name,
                "ContainerPort": service.container_port,
                "TargetGroupArn": reference(TARGET_GROUP)
            }],
            "NetworkConfiguration": {
                "AwsvpcConfiguration": {
                    "AssignPublicIp": "DISABLED",
                    "SecurityGroups": [get_att(SERVICE_SECURITY_GROUP, "GroupId")],
                    "Subnets": subnets
                }
            }
        }),
    );
    // The target group must be attached to a listener before the service
    // can register tasks in it.
    resource.depends_on = vec![LISTENER.to_string()];
    resources.insert(service.logical_id.clone(), resource);
}
