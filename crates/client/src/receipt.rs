use alloy_primitives::TxHash;
use alloy_provider::Provider;
use claim::ChainError;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, info, warn};

/// Poll for the receipt of `tx_hash`.
///
/// Delays grow 500ms, 1s, 2s, ... capped at 12s, for at most `attempts` polls.
/// Returns `Ok(())` when the transaction succeeded, `ChainError::Reverted` when it was mined
/// and reverted, and `ChainError::Transport` when no receipt showed up in time.
pub async fn wait_for_receipt<P>(
    provider: &P,
    tx_hash: TxHash,
    attempts: usize,
) -> Result<(), ChainError>
where
    P: Provider,
{
    let retry_strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(12))
        .take(attempts);

    let receipt = Retry::spawn(retry_strategy, || async {
        match provider.get_transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => Ok(receipt),
            Ok(None) => {
                debug!(%tx_hash, "Receipt not available yet");
                Err(ChainError::Transport(format!(
                    "no receipt for {tx_hash} yet"
                )))
            }
            Err(e) => {
                warn!(%tx_hash, error = %e, "Receipt query failed, will retry");
                Err(ChainError::Transport(e.to_string()))
            }
        }
    })
    .await?;

    if !receipt.status() {
        warn!(%tx_hash, block = ?receipt.block_number, "Claim transaction reverted");
        return Err(ChainError::Reverted(format!("transaction {tx_hash} reverted")));
    }

    info!(
        %tx_hash,
        block = ?receipt.block_number,
        gas_used = receipt.gas_used,
        "Claim transaction confirmed"
    );
    Ok(())
}
