//! Network presets.
//!
//! Provides chain-specific parameters for the networks the faucet is deployed on.

use crate::ConfigError;
use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    ZkSync,
    Polygon,
    Optimism,
    Arbitrum,
    Base,
    #[default]
    Sepolia,
    Anvil,
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "zksync" => Ok(Self::ZkSync),
            "polygon" => Ok(Self::Polygon),
            "optimism" => Ok(Self::Optimism),
            "arbitrum" => Ok(Self::Arbitrum),
            "base" => Ok(Self::Base),
            "sepolia" => Ok(Self::Sepolia),
            "anvil" => Ok(Self::Anvil),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

/// Chain parameters for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// Chain ID
    pub chain_id: u64,
    /// Block explorer base URL
    pub explorer_url: Option<&'static str>,
    /// RPC endpoint used when none is configured
    pub default_rpc_url: Option<&'static str>,
}

impl NetworkConfig {
    /// Ethereum mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain_id: 1,
            explorer_url: Some("https://etherscan.io"),
            default_rpc_url: None,
        }
    }

    /// ZKsync Era mainnet configuration.
    pub const fn zksync() -> Self {
        Self::hosted(NetworkType::ZkSync, 324, "https://explorer.zksync.io")
    }

    /// Polygon PoS mainnet configuration.
    pub const fn polygon() -> Self {
        Self::hosted(NetworkType::Polygon, 137, "https://polygonscan.com")
    }

    /// OP mainnet configuration.
    pub const fn optimism() -> Self {
        Self::hosted(NetworkType::Optimism, 10, "https://optimistic.etherscan.io")
    }

    /// Arbitrum One configuration.
    pub const fn arbitrum() -> Self {
        Self::hosted(NetworkType::Arbitrum, 42161, "https://arbiscan.io")
    }

    /// Base mainnet configuration.
    pub const fn base() -> Self {
        Self::hosted(NetworkType::Base, 8453, "https://basescan.org")
    }

    /// Ethereum Sepolia testnet configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Sepolia,
            chain_id: 11155111,
            explorer_url: Some("https://sepolia.etherscan.io"),
            default_rpc_url: None,
        }
    }

    // Public network with an explorer and no default RPC endpoint.
    const fn hosted(network_type: NetworkType, chain_id: u64, explorer_url: &'static str) -> Self {
        Self {
            network_type,
            chain_id,
            explorer_url: Some(explorer_url),
            default_rpc_url: None,
        }
    }

    /// Local anvil node.
    pub const fn anvil() -> Self {
        Self {
            network_type: NetworkType::Anvil,
            chain_id: 31337,
            explorer_url: None,
            default_rpc_url: Some("http://127.0.0.1:8545"),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::ZkSync => Self::zksync(),
            NetworkType::Polygon => Self::polygon(),
            NetworkType::Optimism => Self::optimism(),
            NetworkType::Arbitrum => Self::arbitrum(),
            NetworkType::Base => Self::base(),
            NetworkType::Sepolia => Self::sepolia(),
            NetworkType::Anvil => Self::anvil(),
        }
    }

    /// Explorer link for a transaction, when the network has an explorer.
    pub fn tx_url(&self, tx_hash: TxHash) -> Option<String> {
        self.explorer_url
            .map(|base| format!("{base}/tx/{tx_hash}"))
    }
}
