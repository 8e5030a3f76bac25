//! Configuration for the statestore demo binary

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Actions dispatched by the walkthrough when --steps is not given
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Concurrent dispatching tasks used by the pump demo
    #[serde(default = "default_tasks")]
    pub tasks: usize,
}

fn default_steps() -> usize {
    8
}

fn default_tasks() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            tasks: default_tasks(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("statestore").join("config.yml")),
            Some(PathBuf::from("statestore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
