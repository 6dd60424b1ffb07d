use crate::common::errors::{decode_contract_error, decode_revert_data};
use alloy::providers::PendingTransactionError;
use alloy::transports::{RpcError, TransportError};

/// EIP-1193 code returned by wallets when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC code for an unsupported method.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Errors surfaced by every gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No wallet provider is configured or reachable.
    #[error("no wallet provider available")]
    WalletUnavailable,

    /// The wallet declined the request.
    #[error("request rejected by the wallet user")]
    UserRejected,

    /// A write was attempted without a session account.
    #[error("no wallet account connected")]
    NotConnected,

    /// Reverted or failed transaction.
    #[error("chain error: {0}")]
    Chain(String),

    /// Endpoint unreachable.
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("invalid deadline: {0}")]
    InvalidDeadline(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("donation sequences differ in length ({donators} donators, {amounts} amounts)")]
    DonationsMismatch { donators: usize, amounts: usize },
}

impl GatewayError {
    /// Classify a JSON-RPC transport error.
    pub fn from_transport(err: &TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) if payload.code == USER_REJECTED_CODE => {
                Self::UserRejected
            }
            RpcError::ErrorResp(payload) if is_rejection_message(&payload.message) => {
                Self::UserRejected
            }
            RpcError::ErrorResp(payload) => match payload.as_revert_data() {
                Some(data) => Self::Chain(decode_revert_data(&data).to_string()),
                None => Self::Chain(payload.message.to_string()),
            },
            RpcError::Transport(kind) => Self::Network(kind.to_string()),
            RpcError::NullResp | RpcError::SerError(_) | RpcError::DeserError { .. } => {
                Self::InvalidResponse(err.to_string())
            }
            _ => Self::Network(err.to_string()),
        }
    }

    /// Classify an error raised while simulating or sending a contract call.
    pub fn from_contract(method: &str, err: alloy::contract::Error) -> Self {
        match &err {
            alloy::contract::Error::TransportError(inner) => match Self::from_transport(inner) {
                Self::Chain(reason) => Self::Chain(format!("{method} reverted: {reason}")),
                other => other,
            },
            _ => Self::Chain(format!("{method} failed: {}", decode_contract_error(&err))),
        }
    }

    /// Classify an error raised while waiting for a receipt.
    pub fn from_pending(method: &str, err: PendingTransactionError) -> Self {
        match &err {
            PendingTransactionError::TransportError(inner) => Self::from_transport(inner),
            _ => Self::Network(format!("{method} confirmation failed: {err}")),
        }
    }

    /// True when the failure originated on-chain rather than locally or in transit.
    pub fn is_chain(&self) -> bool {
        matches!(self, Self::Chain(_))
    }
}

fn is_rejection_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("user rejected") || message.contains("user denied")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::sol_types::{Revert, SolError};
    use alloy::transports::TransportErrorKind;
    use std::borrow::Cow;

    fn error_resp(code: i64, message: &'static str) -> TransportError {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: Cow::Borrowed(message),
            data: None,
        })
    }

    #[test]
    fn test_user_rejected_by_code() {
        let err = error_resp(USER_REJECTED_CODE, "denied");
        assert!(matches!(
            GatewayError::from_transport(&err),
            GatewayError::UserRejected
        ));
    }

    #[test]
    fn test_user_rejected_by_message() {
        let err = error_resp(-32000, "MetaMask Tx Signature: User denied transaction signature.");
        assert!(matches!(
            GatewayError::from_transport(&err),
            GatewayError::UserRejected
        ));
    }

    #[test]
    fn test_error_response_is_chain_error() {
        let err = error_resp(-32000, "insufficient funds for gas * price + value");
        let classified = GatewayError::from_transport(&err);
        assert!(classified.is_chain());
        assert!(classified.to_string().contains("insufficient funds"));
    }

    #[test]
    fn test_transport_failure_is_network_error() {
        let err: TransportError = TransportErrorKind::custom_str("connection refused");
        let classified = GatewayError::from_transport(&err);
        assert!(matches!(classified, GatewayError::Network(_)));
        assert!(classified.to_string().contains("connection refused"));
    }

    #[test]
    fn test_revert_reason_is_decoded() {
        let revert = Revert {
            reason: "The deadline should be a date in the future.".to_string(),
        };
        let data = alloy::hex::encode_prefixed(revert.abi_encode());
        let payload: ErrorPayload = serde_json::from_value(serde_json::json!({
            "code": 3,
            "message": "execution reverted",
            "data": data,
        }))
        .unwrap();
        let err: TransportError = RpcError::ErrorResp(payload);

        let classified = GatewayError::from_transport(&err);
        assert!(classified.is_chain());
        assert!(classified.to_string().contains("deadline should be a date"));
    }

    #[test]
    fn test_donations_mismatch_message() {
        let err = GatewayError::DonationsMismatch {
            donators: 2,
            amounts: 1,
        };
        assert!(err.to_string().contains("2 donators, 1 amounts"));
    }
}
