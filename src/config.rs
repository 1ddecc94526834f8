use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use toml;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend, e.g. `https://example.backend.co`.
    pub url: String,
    pub api_key: String,
    /// Database schema exposed through the REST layer.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Operator name recorded in audit trails.
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_operator() -> String {
    "suretrack".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_path("config.toml")
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&config_str).map_err(|e| Error::Config(e.to_string()))?;
        info!(
            "Loaded config for backend {} (schema {})",
            config.backend.url, config.backend.schema
        );
        Ok(config)
    }
}
