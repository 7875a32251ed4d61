//! Provider-side naming and range rules.
//!
//! The builder never checks its input. These are the rules the provider SDK
//! applies at synth time, so a bad stack name fails here, before anything is
//! handed to the engine.

use regex::Regex;

use albstack_core::Topology;

use crate::error::{SynthError, SynthResult, Violation};

struct NamePatterns {
    table: Regex,
    role: Regex,
    container: Regex,
}

impl NamePatterns {
    fn compile() -> SynthResult<Self> {
        Ok(Self {
            table: Regex::new(r"^[A-Za-z0-9_.\-]{3,255}$")?,
            role: Regex::new(r"^[A-Za-z0-9_+=,.@\-]{1,64}$")?,
            container: Regex::new(r"^[A-Za-z0-9_\-]{1,255}$")?,
        })
    }
}

/// Check every rule and report all violations at once.
pub fn validate(topology: &Topology) -> SynthResult<()> {
    let patterns = NamePatterns::compile()?;
    let mut violations = Vec::new();

    if !patterns.table.is_match(&topology.table.name) {
        violations.push(Violation::TableName {
            name: topology.table.name.clone(),
        });
    }
    if !patterns.role.is_match(&topology.identity.name) {
        violations.push(Violation::RoleName {
            name: topology.identity.name.clone(),
        });
    }
    if !patterns.container.is_match(&topology.service.container_name) {
        violations.push(Violation::ContainerName {
            name: topology.service.container_name.clone(),
        });
    }

    let prefix = &topology.service.logging.stream_prefix;
    if prefix.contains(':') || prefix.contains('*') {
        violations.push(Violation::LogStreamPrefix {
            prefix: prefix.clone(),
        });
    }

    if topology.service.container_port == 0 {
        violations.push(Violation::ContainerPort(topology.service.container_port));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SynthError::Validation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use albstack_core::{build_topology, ClusterRef, DeploymentRequest, NetworkRef};

    fn topology(stack: &str, port: u16) -> Topology {
        build_topology(&DeploymentRequest {
            stack_name: stack.to_string(),
            network: NetworkRef::new("vpc-1"),
            cluster: ClusterRef::new("c"),
            infra_version: "1.0.0".to_string(),
            container_port: port,
        })
    }

    fn violations(topo: &Topology) -> Vec<Violation> {
        match validate(topo) {
            Err(SynthError::Validation(v)) => v,
            Err(e) => panic!("unexpected error: {e}"),
            Ok(()) => Vec::new(),
        }
    }

    #[test]
    fn orders_is_valid() {
        assert!(validate(&topology("Orders", 8080)).is_ok());
    }

    #[test]
    fn port_zero_is_rejected() {
        assert_eq!(violations(&topology("Orders", 0)), vec![Violation::ContainerPort(0)]);
    }

    #[test]
    fn spaces_break_every_name() {
        let v = violations(&topology("My Stack", 80));
        assert!(v.iter().any(|x| matches!(x, Violation::TableName { .. })));
        assert!(v.iter().any(|x| matches!(x, Violation::RoleName { .. })));
        assert!(v.iter().any(|x| matches!(x, Violation::ContainerName { .. })));
    }

    #[test]
    fn non_ascii_role_name_is_rejected() {
        let v = violations(&topology("Ördérs", 80));
        assert!(v.contains(&Violation::RoleName {
            name: "ÖrdérsRole".to_string()
        }));
    }

    #[test]
    fn role_punctuation_is_accepted() {
        assert!(validate(&topology("svc_a-b", 80)).is_ok());
        let v = violations(&topology("a+b=c,d@e", 80));
        assert!(!v.iter().any(|x| matches!(x, Violation::RoleName { .. })));
    }

    #[test]
    fn long_stack_name_only_breaks_role() {
        // 61 chars + "Role" = 65, over the role limit; table and container
        // names stay well under 255.
        let stack = "a".repeat(61);
        let v = violations(&topology(&stack, 80));
        assert_eq!(v.len(), 1);
        assert!(matches!(v[0], Violation::RoleName { .. }));
    }

    #[test]
    fn colon_in_stack_name_breaks_log_prefix() {
        let v = violations(&topology("a:b", 80));
        assert!(v.iter().any(|x| matches!(x, Violation::LogStreamPrefix { .. })));
    }

    #[test]
    fn empty_stack_name_still_yields_valid_names() {
        // "-DataTable", "Role", "Container", "Log" all satisfy the provider rules.
        assert!(validate(&topology("", 80)).is_ok());
    }
}
