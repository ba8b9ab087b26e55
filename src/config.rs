use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    aggregators::WagerEnumeration, chains::registry::ContractRegistry, errors::ChainError,
    retry::RetryPolicy,
};

/// Configuration for the indexer service, read from a TOML file with
/// `INDEXER__SECTION__KEY` environment overrides.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct IndexerConfig {
    pub core: Core,
    #[serde(default)]
    pub chains: Vec<ChainEndpoint>,
    #[serde(default)]
    pub contracts: Vec<ContractAddresses>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Core {
    pub db_url: String,
    /// Seconds between cycles.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
    /// Seconds between retries of a failed call.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    /// 0 retries forever.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds a single call may take, 0 disables the limit.
    #[serde(default = "default_call_timeout")]
    pub call_timeout: u64,
    #[serde(default = "default_leaderboard_enumeration")]
    pub leaderboard_enumeration: WagerEnumeration,
    #[serde(default = "default_require_ssl")]
    pub require_ssl: bool,
}

/// An RPC endpoint. Its chain id is asked from the node every cycle.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ChainEndpoint {
    pub name: String,
    pub rpc_url: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ContractAddresses {
    pub chain_id: u64,
    pub chess_wager: String,
    pub tournament: String,
}

fn default_polling_interval() -> u64 {
    1200
}

fn default_retry_delay() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    30
}

fn default_call_timeout() -> u64 {
    30
}

fn default_leaderboard_enumeration() -> WagerEnumeration {
    WagerEnumeration::Probe
}

fn default_require_ssl() -> bool {
    true
}

impl IndexerConfig {
    /// Loads indexer configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("INDEXER").separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration file at {path}"))?;

        config
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {path}"))
    }

    pub fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml_str, FileFormat::Toml))
            .build()
            .context("Failed to build config from string")?;

        config.try_deserialize().context("Deserialization failed")
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let max_attempts = match self.core.max_retries {
            0 => None,
            n => Some(n),
        };
        let call_timeout = match self.core.call_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        RetryPolicy::new(
            Duration::from_secs(self.core.retry_delay),
            max_attempts,
            call_timeout,
        )
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.core.polling_interval)
    }

    pub fn registry(&self) -> Result<ContractRegistry, ChainError> {
        ContractRegistry::from_entries(&self.contracts)
    }
}
