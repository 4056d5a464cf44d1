use crate::config::SlalomConfig;
use anyhow::Result;
use colored::*;
use std::path::Path;

/// Print the effective config, or the built-in defaults, or write it to `output`
pub fn execute_config(config: &SlalomConfig, defaults: bool, output: Option<&Path>) -> Result<()> {
    let config = if defaults {
        SlalomConfig::default()
    } else {
        config.clone()
    };

    match output {
        Some(path) => {
            config.save(path)?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
