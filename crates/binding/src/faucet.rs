//! Token faucet contract bindings.

use alloy_sol_types::sol;

sol! {
    /// Faucet that hands out a fixed token amount per recipient and cooldown window.
    ///
    /// The cooldown is enforced by the contract; a claim inside the window reverts.
    #[sol(rpc)]
    interface IFaucet {
        /// Emitted when a claim is paid out
        event TokensClaimed(
            address indexed recipient,
            uint256 amount
        );

        /// Transfer the faucet allotment to `recipient`
        function claim(address recipient) external;
    }
}
