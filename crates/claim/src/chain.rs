//! Boundary to the chain write service.

use crate::HexAddress;
use alloy_primitives::TxHash;
use serde::Serialize;
use std::future::Future;
use thiserror::Error;

/// Signature of the one contract function the workflow calls.
pub const CLAIM_SELECTOR: &str = "claim(address)";

/// Failures reported by the chain write service.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ChainError {
    /// The signer or the node refused the transaction (e.g. user declined signing)
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// Execution reverted
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// Network or RPC failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The call descriptor cannot be encoded
    #[error("unsupported call: {0}")]
    UnsupportedCall(String),
}

/// A structured contract write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Target contract
    pub contract: HexAddress,
    /// Solidity function signature, e.g. `claim(address)`
    pub selector: &'static str,
    /// Positional arguments
    pub args: Vec<HexAddress>,
}

impl FunctionCall {
    /// The claim call: `claim(recipient)` on `contract`.
    pub fn claim(contract: HexAddress, recipient: HexAddress) -> Self {
        Self {
            contract,
            selector: CLAIM_SELECTOR,
            args: vec![recipient],
        }
    }
}

/// Submits contract writes and reports the transaction identifier.
///
/// Implementations are not expected to support cancellation. A call that was issued may
/// still resolve after the caller lost interest in it.
pub trait ChainWriter: Send + Sync + 'static {
    /// Send `call` and resolve once the transaction has been handed to the network.
    fn send(&self, call: FunctionCall) -> impl Future<Output = Result<TxHash, ChainError>> + Send;
}
