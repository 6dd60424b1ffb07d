use crate::endpoint::TransactionHandle;
use crate::error::GatewayError;
use crate::model::Confirmation;
use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::Ethereum,
    primitives::B256,
    providers::{PendingTransactionBuilder, Provider},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Sends contract writes one at a time and hands back a confirmable handle.
#[derive(Clone)]
pub(crate) struct TransactionSubmitter {
    tx_lock: Arc<Mutex<()>>,
}

impl TransactionSubmitter {
    pub(crate) fn new(tx_lock: Arc<Mutex<()>>) -> Self {
        Self { tx_lock }
    }

    pub(crate) async fn submit<P, D>(
        &self,
        method: &'static str,
        call: CallBuilder<P, D>,
    ) -> Result<Box<dyn TransactionHandle>, GatewayError>
    where
        P: Provider + Clone,
        D: CallDecoder + Clone,
    {
        // Pre-simulate to catch reverts with proper error messages
        if let Err(e) = call.call().await {
            let e = GatewayError::from_contract(method, e);
            warn!(method, error = %e, "simulation failed");
            return Err(e);
        }

        // Acquire lock and send
        let _guard = self.tx_lock.lock().await;
        let pending = call
            .send()
            .await
            .map_err(|e| GatewayError::from_contract(method, e))?;

        info!(method, tx_hash = ?pending.tx_hash(), "transaction sent");

        Ok(Box::new(PendingCall { method, pending }))
    }
}

/// A sent transaction awaiting its receipt.
pub(crate) struct PendingCall {
    method: &'static str,
    pending: PendingTransactionBuilder<Ethereum>,
}

#[async_trait]
impl TransactionHandle for PendingCall {
    fn tx_hash(&self) -> B256 {
        *self.pending.tx_hash()
    }

    async fn await_confirmation(self: Box<Self>) -> Result<Confirmation, GatewayError> {
        let method = self.method;
        let receipt = self
            .pending
            .get_receipt()
            .await
            .map_err(|e| GatewayError::from_pending(method, e))?;
        let tx_hash = receipt.transaction_hash;

        if !receipt.status() {
            return Err(GatewayError::Chain(format!(
                "{method} reverted on-chain. Tx hash: {tx_hash:?}"
            )));
        }

        info!(
            method,
            tx_hash = ?tx_hash,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "transaction confirmed"
        );

        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}
