//! Contract bindings for the faucet.
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod faucet;
