//! Application configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stateflow::StoreConfig;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "STATEFLOW_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulated latency of fetch slot 1.
    pub fetch1_latency_ms: u64,
    /// Simulated latency of fetch slot 2.
    pub fetch2_latency_ms: u64,
    /// Simulated latency of the profile fetch.
    pub profile_latency_ms: u64,
    /// Upper bound for any single effect. Unset means effects are unbounded.
    pub effect_timeout_ms: Option<u64>,
    /// `tracing-subscriber` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch1_latency_ms: 1000,
            fetch2_latency_ms: 1500,
            profile_latency_ms: 500,
            effect_timeout_ms: None,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Load from the file named by [`CONFIG_ENV`], or fall back to defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            effect_timeout_ms: self.effect_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{ "fetch2_latency_ms": 20 }"#).unwrap();
        assert_eq!(config.fetch1_latency_ms, 1000);
        assert_eq!(config.fetch2_latency_ms, 20);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.store_config(), StoreConfig::default());
    }

    #[test]
    fn timeout_flows_into_store_config() {
        let config = AppConfig::from_json(r#"{ "effect_timeout_ms": 3000 }"#).unwrap();
        assert_eq!(config.store_config().effect_timeout_ms, Some(3000));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("invalid config JSON"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AppConfig::load(Path::new("/nonexistent/stateflow.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stateflow.json"));
    }
}
