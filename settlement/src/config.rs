//! Configuration for the settlement service

use serde::{Deserialize, Serialize};

/// Settlement service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Underlying ledger configuration (data directory, reporting offset,
    /// RocksDB tuning)
    pub ledger: payment_ledger::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settlement".to_string(),
            ledger: payment_ledger::Config::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(payment_ledger::Error::Io)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.ledger = payment_ledger::Config::from_env()?;

        if let Ok(name) = std::env::var("SETTLE_SERVICE_NAME") {
            config.service_name = name;
        }

        Ok(config)
    }
}
