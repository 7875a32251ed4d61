use std::path::Path;

use anyhow::Context;
use tracing::info;

use albstack_core::{build_topology, DeployConfig};

/// Build and synthesize the stack described by `config`.
///
/// Prints the template to stdout, or writes it to `out` and reports the
/// digest.
pub fn synth(config: &str, out: Option<&str>) -> anyhow::Result<()> {
    let written = synth_to(Path::new(config), out.map(Path::new))?;
    if let Some((path, digest)) = written {
        println!("✓ Synthesized {}", path);
        println!("  SHA256: {digest}");
    }
    Ok(())
}

fn synth_to(config: &Path, out: Option<&Path>) -> anyhow::Result<Option<(String, String)>> {
    let config = DeployConfig::from_file(config)?;
    let topology = build_topology(&config.to_request());
    let template = albstack_synth::synthesize(&topology)
        .with_context(|| format!("synthesizing stack {}", topology.request.stack_name))?;
    let json = template.to_json_pretty()?;

    match out {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("writing {}", path.display()))?;
            let digest = template.digest()?;
            info!(path = %path.display(), digest = %digest, "template written");
            Ok(Some((path.display().to_string(), digest)))
        }
        None => {
            println!("{json}");
            Ok(None)
        }
    }
}
