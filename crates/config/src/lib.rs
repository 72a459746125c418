//! Configuration types for the faucet client.
//!
//! This crate provides:
//! - Network presets (mainnet, the major layer 2s, sepolia, local anvil)
//! - Configuration loading from TOML with environment overrides
//! - Fail-fast validation of the faucet contract address

mod error;
pub mod network;
pub mod settings;

pub use error::ConfigError;
pub use network::{NetworkConfig, NetworkType};
pub use settings::{Environment, FaucetConfig};
