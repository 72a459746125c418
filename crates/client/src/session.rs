use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use claim::{HexAddress, Session};

/// Session of a locally held signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSession {
    address: Address,
    chain_id: Option<u64>,
}

impl LocalSession {
    pub const fn new(address: Address, chain_id: Option<u64>) -> Self {
        Self { address, chain_id }
    }

    /// Session for `signer` on the network with `chain_id`, if known.
    pub fn from_signer(signer: &PrivateKeySigner, chain_id: Option<u64>) -> Self {
        Self::new(signer.address(), chain_id)
    }
}

impl Session for LocalSession {
    fn current_address(&self) -> Option<HexAddress> {
        Some(HexAddress::from(self.address))
    }

    fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_local_session() {
        let session = LocalSession::new(
            address!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            Some(31337),
        );

        assert_eq!(
            claim::prefill(&session),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_eq!(session.chain_id(), Some(31337));
    }
}
