use crate::error::GatewayError;
use crate::model::{Confirmation, CreateCampaignArgs, RawCampaign};
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

/// A submitted write that has not been confirmed yet.
#[async_trait]
pub trait TransactionHandle: Send {
    fn tx_hash(&self) -> B256;

    /// Wait for the receipt. A reverted receipt is a [`GatewayError::Chain`].
    async fn await_confirmation(self: Box<Self>) -> Result<Confirmation, GatewayError>;
}

/// Read and write procedures of the deployed CrowdFunding contract.
///
/// Writes take a signer obtained from the matching wallet connector.
#[async_trait]
pub trait ContractEndpoint: Send + Sync {
    type Signer: Send + Sync;

    async fn create_campaign(
        &self,
        signer: &Self::Signer,
        args: CreateCampaignArgs,
    ) -> Result<Box<dyn TransactionHandle>, GatewayError>;

    async fn get_campaigns(&self) -> Result<Vec<RawCampaign>, GatewayError>;

    async fn donate_to_campaign(
        &self,
        signer: &Self::Signer,
        campaign_id: U256,
        value: U256,
    ) -> Result<Box<dyn TransactionHandle>, GatewayError>;

    /// Donators and their amounts as two parallel sequences.
    async fn get_donators(
        &self,
        campaign_id: U256,
    ) -> Result<(Vec<Address>, Vec<U256>), GatewayError>;
}
