//! Client configuration file and environment overrides.

use crate::{ConfigError, NetworkConfig, NetworkType};
use claim::HexAddress;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

/// Overrides `contract_address`.
pub const CONTRACT_ADDRESS_VAR: &str = "FAUCET_CONTRACT_ADDRESS";
/// Overrides `rpc_url`.
pub const RPC_URL_VAR: &str = "FAUCET_RPC_URL";
/// Overrides `network`.
pub const NETWORK_VAR: &str = "FAUCET_NETWORK";
/// Overrides `environment`.
pub const ENVIRONMENT_VAR: &str = "FAUCET_ENV";

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

/// Top-level faucet client configuration.
///
/// ```toml
/// network = "sepolia"
/// rpc_url = "https://ethereum-sepolia-rpc.publicnode.com"
/// contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
/// environment = "development"
/// metrics_port = 9090
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaucetConfig {
    /// Network the faucet is deployed on
    pub network: NetworkType,

    /// RPC endpoint url; falls back to the network default
    pub rpc_url: Option<String>,

    /// Faucet contract address, validated by [`FaucetConfig::contract`]
    pub contract_address: Option<String>,

    /// Deployment environment
    pub environment: Environment,

    /// Port for the Prometheus exporter; disabled when unset
    pub metrics_port: Option<u16>,
}

impl FaucetConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from `path` (or defaults when `None`) and apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name. Empty values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = var(CONTRACT_ADDRESS_VAR) {
            self.contract_address = Some(value);
        }
        if let Some(value) = var(RPC_URL_VAR) {
            self.rpc_url = Some(value);
        }
        if let Some(value) = var(NETWORK_VAR) {
            self.network = value.parse()?;
        }
        if let Some(value) = var(ENVIRONMENT_VAR) {
            self.environment = value.parse()?;
        }

        Ok(self)
    }

    /// The validated faucet contract address.
    pub fn contract(&self) -> Result<HexAddress, ConfigError> {
        let value = self
            .contract_address
            .as_deref()
            .ok_or(ConfigError::MissingContractAddress)?;

        let address =
            claim::validate(value).map_err(|source| ConfigError::InvalidContractAddress {
                value: value.to_string(),
                source,
            })?;

        if address.value().is_zero() {
            return Err(ConfigError::ZeroContractAddress);
        }

        Ok(address)
    }

    pub const fn network_config(&self) -> NetworkConfig {
        NetworkConfig::from_network_type(self.network)
    }

    /// Configured RPC url, or the network default.
    pub fn rpc_url(&self) -> Result<&str, ConfigError> {
        self.rpc_url
            .as_deref()
            .or(self.network_config().default_rpc_url)
            .ok_or(ConfigError::MissingRpcUrl(self.network))
    }
}
