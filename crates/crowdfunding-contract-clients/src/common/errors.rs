//! # Revert decoding
//!
//! Turns raw revert payloads into readable messages. Handles the standard
//! `Error(string)` and `Panic(uint256)` encodings; anything else is kept as
//! raw hex so callers still see what the contract returned.

use alloy::primitives::Bytes;
use alloy::sol_types::decode_revert_reason;
use std::fmt;

/// Outcome of decoding a contract failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRevert {
    /// A standard revert reason or panic description.
    Reason(String),
    /// Revert data that matched no known encoding.
    Raw(Bytes),
    /// The failure carried no revert data; holds the original message.
    NoRevertData(String),
}

impl fmt::Display for DecodedRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedRevert::Reason(reason) => write!(f, "{reason}"),
            DecodedRevert::Raw(data) => write!(f, "unknown revert data {data}"),
            DecodedRevert::NoRevertData(message) => write!(f, "{message}"),
        }
    }
}

/// Decode raw revert bytes.
pub fn decode_revert_data(data: &[u8]) -> DecodedRevert {
    match decode_revert_reason(data) {
        Some(reason) => DecodedRevert::Reason(reason),
        None => DecodedRevert::Raw(Bytes::copy_from_slice(data)),
    }
}

/// Decode a contract call error, falling back to its message when no revert data is attached.
pub fn decode_contract_error(error: &alloy::contract::Error) -> DecodedRevert {
    match error.as_revert_data() {
        Some(data) => decode_revert_data(&data),
        None => DecodedRevert::NoRevertData(error.to_string()),
    }
}
