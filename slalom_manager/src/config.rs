//! `slalom.toml` handling
//!
//! Every section is optional; anything missing falls back to the defaults the
//! course was tuned with.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slalom_core::{ControlConfig, CourseConfig};
use slalom_library::{PicarConfig, SimulationConfig};
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "slalom.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlalomConfig {
    pub control: ControlConfig,
    pub course: CourseConfig,
    pub picar: PicarConfig,
    pub simulation: SimulationConfig,
}

impl SlalomConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load `path` if given, else `slalom.toml` if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.control.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}
