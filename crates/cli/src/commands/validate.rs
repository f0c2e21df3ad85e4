use anyhow::Result;
use std::path::Path;

use crate::printing::print_parameters;
use crate::utils::load_config;

pub fn validate_config(path: &Path) -> Result<()> {
    println!("🔍 Validating configuration: {}", path.display());

    if !path.exists() {
        anyhow::bail!("Configuration file does not exist");
    }

    let config = load_config(path)?;
    match config.validate() {
        Ok(()) => {
            print_parameters(&config);
            println!("✓ Validation complete: No issues found");
            Ok(())
        }
        Err(e) => {
            println!("✗ Validation failed: {e}");
            Err(e.into())
        }
    }
}
