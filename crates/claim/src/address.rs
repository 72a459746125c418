//! Recipient address validation.
//!
//! An address is accepted iff it is exactly 42 characters long, starts with `0x`, and the
//! remaining 40 characters are hexadecimal digits (either case). Validation is purely
//! syntactic: no EIP-55 checksum check and no case normalization.

use alloy_primitives::{hex, Address};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Total length of a rendered address, prefix included.
pub const ADDRESS_LEN: usize = 42;

/// Required address prefix.
pub const ADDRESS_PREFIX: &str = "0x";

/// Reasons a candidate address is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Input is not 42 characters long.
    #[error("wallet address must be {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// The first two characters are not `0x`.
    #[error("wallet address must start with 0x")]
    BadPrefix,

    /// A character after the prefix is outside `[0-9a-fA-F]`.
    #[error("invalid Ethereum wallet address format: {found:?} at position {position}")]
    BadHex { position: usize, found: char },
}

/// A syntactically valid address.
///
/// Keeps the text exactly as it was entered alongside the decoded 20-byte value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexAddress {
    text: String,
    value: Address,
}

impl HexAddress {
    /// The address as entered.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The decoded account identifier.
    pub const fn value(&self) -> Address {
        self.value
    }
}

impl From<Address> for HexAddress {
    fn from(value: Address) -> Self {
        Self {
            text: value.to_checksum(None),
            value,
        }
    }
}

impl From<HexAddress> for Address {
    fn from(address: HexAddress) -> Self {
        address.value
    }
}

impl fmt::Display for HexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for HexAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Validate a raw candidate address.
///
/// Checks run in order: length, prefix, hex body. The first failing check decides the error.
pub fn validate(input: &str) -> Result<HexAddress, ValidationError> {
    let actual = input.chars().count();
    if actual != ADDRESS_LEN {
        return Err(ValidationError::WrongLength {
            expected: ADDRESS_LEN,
            actual,
        });
    }

    let Some(body) = input.strip_prefix(ADDRESS_PREFIX) else {
        return Err(ValidationError::BadPrefix);
    };

    if let Some((offset, found)) = body.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(ValidationError::BadHex {
            position: ADDRESS_PREFIX.len() + offset,
            found,
        });
    }

    // The body is 40 ASCII hex digits at this point, so decoding cannot fail.
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(body, &mut bytes).map_err(|_| ValidationError::BadHex {
        position: ADDRESS_PREFIX.len(),
        found: body.chars().next().unwrap_or_default(),
    })?;

    Ok(HexAddress {
        text: input.to_string(),
        value: Address::from(bytes),
    })
}
