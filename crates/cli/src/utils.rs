use anyhow::{Context, Result};
use drift_sim::simulation::Configuration;
use std::path::Path;

/// Read and parse a JSON configuration file.
pub fn load_config(path: &Path) -> Result<Configuration> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
