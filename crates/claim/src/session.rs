//! Read-only view of the connected wallet.

use crate::HexAddress;

/// Wallet/session provider.
///
/// The workflow never drives the connection lifecycle. It only reads the connected
/// account and the network identity.
pub trait Session: Send + Sync {
    /// Currently connected account, if any.
    fn current_address(&self) -> Option<HexAddress>;

    /// Chain id of the connected network, if known.
    fn chain_id(&self) -> Option<u64>;
}

/// Initial text of the recipient field.
pub fn prefill(session: &impl Session) -> String {
    session
        .current_address()
        .map(|address| address.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RECIPIENT;

    struct Fixed(Option<HexAddress>);

    impl Session for Fixed {
        fn current_address(&self) -> Option<HexAddress> {
            self.0.clone()
        }

        fn chain_id(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_prefill_connected() {
        let session = Fixed(Some(crate::validate(RECIPIENT).unwrap()));
        assert_eq!(prefill(&session), RECIPIENT);
    }

    #[test]
    fn test_prefill_disconnected() {
        assert_eq!(prefill(&Fixed(None)), "");
    }
}
