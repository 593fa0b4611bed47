use ::config::DevnetConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emit logs as JSON lines instead of human readable text
    pub log_json: bool,

    /// Port for the Prometheus exporter; no exporter when unset
    pub metrics_port: Option<u16>,

    /// Devnet and token parameters
    pub devnet: DevnetConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(path)
    }
}
