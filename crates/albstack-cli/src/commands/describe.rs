//! Human-readable topology report.

use std::path::Path;

use albstack_core::{build_topology, DeployConfig, Topology};

pub fn describe(config: &str, format: &str) -> anyhow::Result<()> {
    let config = DeployConfig::from_file(Path::new(config))?;
    let topology = build_topology(&config.to_request());

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&topology)?);
        }
        _ => {
            println!("{}", format_topology(&topology));
        }
    }

    Ok(())
}

pub fn format_topology(topology: &Topology) -> String {
    let req = &topology.request;
    let svc = &topology.service;
    let mut out = String::new();

    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str("║  albstack Topology                       ║\n");
    out.push_str("╠══════════════════════════════════════════╣\n");
    out.push_str(&format!("║  Stack:    {:<30}║\n", req.stack_name));
    out.push_str(&format!("║  Version:  {:<30}║\n", req.infra_version));
    out.push_str(&format!("║  Cluster:  {:<30}║\n", req.cluster.name));
    out.push_str(&format!("║  Network:  {:<30}║\n", req.network.vpc_id));
    out.push_str("╚══════════════════════════════════════════╝\n\n");

    out.push_str("TABLE:\n");
    out.push_str(&format!("  {} (key: {} {:?})\n", topology.table.name,
        topology.table.partition_key.name, topology.table.partition_key.attribute_type));
    out.push_str(&format!("  on teardown: {:?} (data is not retained)\n\n", topology.table.removal_policy));

    out.push_str("EXECUTION ROLE:\n");
    out.push_str(&format!("  {} (assumed by {})\n", topology.identity.name, topology.identity.trusted_principal));
    for stmt in &topology.identity.statements {
        for action in &stmt.actions {
            out.push_str(&format!("  • {} {} on {}\n", stmt.effect.as_str(), action, stmt.resources.join(", ")));
        }
        if stmt.is_over_broad() {
            out.push_str("  ⚠️  wildcard grant: review before production use\n");
        }
    }
    out.push('\n');

    out.push_str("SERVICE:\n");
    out.push_str(&format!("  Container: {} ({})\n", svc.container_name, svc.image));
    out.push_str(&format!("  Sizing:    {} cpu / {} MiB × {} tasks\n", svc.cpu, svc.memory_mib, svc.desired_count));
    out.push_str(&format!("  Logs:      stream prefix {}\n", svc.logging.stream_prefix));
    out.push_str(&format!("  Rollback:  {}\n", if svc.circuit_breaker.rollback { "on failed health checks" } else { "off" }));
    out.push_str("  Environment:\n");
    for (key, value) in &svc.environment {
        out.push_str(&format!("    {key}={value}\n"));
    }
    out.push('\n');

    let lb = &topology.load_balancer;
    out.push_str("LOAD BALANCER:\n");
    out.push_str(&format!("  :{} → container :{} (health check {})\n", lb.listener_port, lb.target_port, lb.health_check_path));

    out
}
