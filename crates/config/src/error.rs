use crate::NetworkType;
use claim::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration errors. Any of these aborts the client before a workflow exists.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No contract address in the file or the environment
    #[error("faucet contract address is not configured (set contract_address or FAUCET_CONTRACT_ADDRESS)")]
    MissingContractAddress,

    /// Contract address fails validation
    #[error("invalid faucet contract address {value:?}: {source}")]
    InvalidContractAddress {
        value: String,
        #[source]
        source: ValidationError,
    },

    /// Contract address is the zero address
    #[error("faucet contract address must not be zero")]
    ZeroContractAddress,

    /// No RPC URL and the network has no default
    #[error("no RPC URL configured for network {0:?}")]
    MissingRpcUrl(NetworkType),

    /// Unknown `FAUCET_ENV` value
    #[error("invalid environment {0:?} (expected development, test or production)")]
    InvalidEnvironment(String),

    /// Unknown `FAUCET_NETWORK` value
    #[error(
        "invalid network {0:?} (expected mainnet, zksync, polygon, optimism, arbitrum, base, sepolia or anvil)"
    )]
    InvalidNetwork(String),
}
