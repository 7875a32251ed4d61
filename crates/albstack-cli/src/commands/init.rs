use std::path::Path;

use anyhow::bail;
use tracing::info;

use albstack_core::config::{DeployConfig, CONFIG_FILE};

/// Write a scaffold albstack.toml into `path`.
pub fn init(path: &str, name: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join(CONFIG_FILE);
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let config = DeployConfig::scaffold(name);
    std::fs::write(&output, config.to_toml_string()?)?;
    info!(path = %output.display(), stack = name, "scaffold written");
    println!("✓ Generated {}", output.display());

    Ok(())
}
