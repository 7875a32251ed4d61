//! albstack.toml deployment file parser.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{ClusterRef, DeploymentRequest, NetworkRef};

/// Default file name looked up by the CLI.
pub const CONFIG_FILE: &str = "albstack.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    pub stack: StackConfig,
    pub network: NetworkConfig,
    pub cluster: ClusterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    pub name: String,
    pub infra_version: String,
    pub container_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub vpc_id: String,
    pub subnets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
}

impl DeployConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: DeployConfig = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a minimal albstack.toml for a new stack.
    pub fn scaffold(name: &str) -> Self {
        DeployConfig {
            stack: StackConfig {
                name: name.to_string(),
                infra_version: "0.1.0".to_string(),
                container_port: 80,
            },
            network: NetworkConfig {
                vpc_id: "vpc-CHANGEME".to_string(),
                subnets: None,
            },
            cluster: ClusterConfig {
                name: format!("{name}-cluster"),
            },
        }
    }

    pub fn to_request(&self) -> DeploymentRequest {
        DeploymentRequest {
            stack_name: self.stack.name.clone(),
            network: NetworkRef {
                vpc_id: self.network.vpc_id.clone(),
                subnets: self.network.subnets.clone().unwrap_or_default(),
            },
            cluster: ClusterRef::new(self.cluster.name.clone()),
            infra_version: self.stack.infra_version.clone(),
            container_port: self.stack.container_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS: &str = r#"
[stack]
name = "Orders"
infra_version = "1.4.0"
container_port = 8080

[network]
vpc_id = "vpc-0abc"
subnets = ["subnet-1", "subnet-2"]

[cluster]
name = "orders-cluster"
"#;

    #[test]
    fn test_parse_full() {
        let config: DeployConfig = toml::from_str(ORDERS).unwrap();
        let req = config.to_request();
        assert_eq!(req.stack_name, "Orders");
        assert_eq!(req.infra_version, "1.4.0");
        assert_eq!(req.container_port, 8080);
        assert_eq!(req.network.vpc_id, "vpc-0abc");
        assert_eq!(req.network.subnets, vec!["subnet-1", "subnet-2"]);
        assert_eq!(req.cluster.name, "orders-cluster");
    }

    #[test]
    fn test_subnets_optional() {
        let toml_str = r#"
[stack]
name = "a"
infra_version = "1"
container_port = 80

[network]
vpc_id = "vpc-1"

[cluster]
name = "c"
"#;
        let config: DeployConfig = toml::from_str(toml_str).unwrap();
        assert!(config.to_request().network.subnets.is_empty());
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        let toml_str = ORDERS.replace("8080", "70000");
        assert!(toml::from_str::<DeployConfig>(&toml_str).is_err());
    }

    #[test]
    fn test_scaffold() {
        let config = DeployConfig::scaffold("Orders");
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("Orders"));
        assert!(toml_str.contains("Orders-cluster"));
        let back: DeployConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.stack.container_port, 80);
    }

    #[test]
    fn test_from_file_missing() {
        let err = DeployConfig::from_file(Path::new("/nonexistent/albstack.toml")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
