use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_ENDPOINT: &str =
    "https://sentia-gtafbdh7e3ergfdy.eastus2-01.azurewebsites.net/webhook-test/webhook/formulario";
pub const ENDPOINT_ENV: &str = "SENTIA_ENDPOINT";

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Check every required field before submitting instead of leaving
    /// presence checks to the input layer.
    #[serde(default = "default_true")]
    pub enforce_required_fields: bool,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(data_dir)?;
        config.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
        Ok(config)
    }

    /// Read `config.json` from the data directory, writing the defaults when
    /// it is missing. An empty or unparsable file is replaced by defaults.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(Self::default_data_dir);

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path).context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!(path = %config_path.display(), "config file is empty, recreating defaults");
            } else {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %config_path.display(), error = %e, "failed to parse config.json, recreating defaults");
                    }
                }
            }
        }

        let config = Self::default_config(data_dir);
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let json_str = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(self.config_file(), json_str).context("Failed to write config.json")?;
        Ok(())
    }

    fn default_data_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentia")
            .join("intake")
    }

    fn default_config(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: default_timeout_secs(),
            enforce_required_fields: true,
        }
    }

    /// Replace the endpoint when the override is present and non-empty.
    pub fn apply_endpoint_override(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint;
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
