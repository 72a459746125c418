use alloy_primitives::{Address, TxHash};
use alloy_provider::Provider;
use alloy_sol_types::SolCall;
use binding::faucet::IFaucet;
use claim::{ChainError, ChainWriter, FunctionCall};
use tracing::{debug, info};

/// Chain write service backed by an alloy wallet provider.
///
/// Sends `claim(recipient)` to the faucet and returns as soon as the node accepted the
/// transaction. Receipts are not awaited here; see [`crate::wait_for_receipt`].
pub struct FaucetWriter<P> {
    provider: P,
}

impl<P> FaucetWriter<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> ChainWriter for FaucetWriter<P>
where
    P: Provider + Clone + 'static,
{
    async fn send(&self, call: FunctionCall) -> Result<TxHash, ChainError> {
        let recipient = claim_recipient(&call)?;

        debug!(
            contract = %call.contract,
            recipient = %recipient,
            "Sending faucet claim"
        );

        let faucet = IFaucet::new(call.contract.value(), &self.provider);
        let pending = faucet
            .claim(recipient)
            .send()
            .await
            .map_err(classify_error)?;

        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, recipient = %recipient, "Faucet claim broadcast");

        Ok(tx_hash)
    }
}

/// Check the descriptor is the faucet claim and extract its single argument.
fn claim_recipient(call: &FunctionCall) -> Result<Address, ChainError> {
    if call.selector != IFaucet::claimCall::SIGNATURE {
        return Err(ChainError::UnsupportedCall(format!(
            "unknown function {}",
            call.selector
        )));
    }

    match call.args.as_slice() {
        [recipient] => Ok(recipient.value()),
        args => Err(ChainError::UnsupportedCall(format!(
            "{} takes 1 argument, got {}",
            call.selector,
            args.len()
        ))),
    }
}

fn classify_error(err: alloy_contract::Error) -> ChainError {
    match err {
        alloy_contract::Error::TransportError(err) => match err.as_error_resp() {
            Some(payload) => classify_rpc_message(&payload.message),
            None => ChainError::Transport(err.to_string()),
        },
        other => ChainError::Rejected(other.to_string()),
    }
}

/// Map a JSON-RPC error message from the node or wallet.
fn classify_rpc_message(message: &str) -> ChainError {
    if message.to_ascii_lowercase().contains("revert") {
        ChainError::Reverted(message.to_string())
    } else {
        ChainError::Rejected(message.to_string())
    }
}
