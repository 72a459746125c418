//! Faucet claim core.
//!
//! This crate provides:
//! - Recipient address validation ([`address`])
//! - The claim submission state machine ([`workflow`])
//! - Short-lived "copied" acknowledgements for copyable fields ([`clipboard`])
//! - The seams to the chain write service and the wallet session ([`chain`], [`session`])
//!
//! Nothing in here talks to a network directly. Adapters for alloy providers live in the
//! `client` crate.

pub mod address;
pub mod chain;
pub mod clipboard;
pub mod session;
pub mod workflow;

pub use address::{validate, HexAddress, ValidationError};
pub use chain::{ChainError, ChainWriter, FunctionCall, CLAIM_SELECTOR};
pub use clipboard::{Clipboard, ClipboardFeedback, PlatformError, ACK_WINDOW};
pub use session::{prefill, Session};
pub use workflow::{
    ClaimAttempt, ClaimFailure, ClaimStatus, ClaimWorkflow, STATUS_CHANNEL_CAPACITY,
};
