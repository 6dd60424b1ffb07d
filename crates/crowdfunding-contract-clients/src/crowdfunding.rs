use crate::{
    ContractConfig,
    common::tx_submitter::TransactionSubmitter,
    endpoint::{ContractEndpoint, TransactionHandle},
    error::GatewayError,
    model::{CreateCampaignArgs, RawCampaign},
    wallet::SignerHandle,
};
use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider},
    sol,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    contract CrowdFunding {
        struct Campaign {
            address owner;
            string title;
            string description;
            uint256 target;
            uint256 deadline;
            uint256 amountCollected;
            address[] donators;
            uint256[] donations;
        }

        function createCampaign(
            address _owner,
            string memory _title,
            string memory _description,
            uint256 _target,
            uint256 _deadline
        ) public returns (uint256);
        function donateToCampaign(uint256 _id) public payable;
        function getDonators(uint256 _id) public view returns (address[] memory donators, uint256[] memory donations);
        function getCampaigns() public view returns (Campaign[] memory);
        function numberOfCampaigns() public view returns (uint256);
    }
}

use CrowdFunding::CrowdFundingInstance;

impl From<CrowdFunding::Campaign> for RawCampaign {
    fn from(campaign: CrowdFunding::Campaign) -> Self {
        Self {
            owner: campaign.owner,
            title: campaign.title,
            description: campaign.description,
            target: campaign.target,
            deadline: campaign.deadline,
            amount_collected: campaign.amountCollected,
        }
    }
}

/// Client for the deployed CrowdFunding contract.
///
/// Reads go through the shared provider `P`. Writes bind the contract to the
/// signer's own provider for the duration of one call.
#[derive(Clone)]
pub struct CrowdFundingClient<P: Provider + Clone> {
    contract: CrowdFundingInstance<P>,
    submitter: TransactionSubmitter,
}

impl<P: Provider + Clone> CrowdFundingClient<P> {
    pub fn new(provider: P, config: &ContractConfig) -> Self {
        let contract =
            CrowdFundingInstance::new(config.crowdfunding_contract_address, provider.clone());
        let submitter = TransactionSubmitter::new(Arc::new(Mutex::new(())));
        Self {
            contract,
            submitter,
        }
    }

    /// Get the contract address
    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Number of campaigns stored in the contract
    pub async fn campaign_count(&self) -> Result<U256, GatewayError> {
        self.contract
            .numberOfCampaigns()
            .call()
            .await
            .map_err(|e| GatewayError::from_contract("numberOfCampaigns", e))
    }

    fn with_signer(&self, signer: &SignerHandle) -> CrowdFundingInstance<DynProvider> {
        CrowdFundingInstance::new(self.address(), signer.provider().clone())
    }
}

#[async_trait]
impl<P: Provider + Clone> ContractEndpoint for CrowdFundingClient<P> {
    type Signer = SignerHandle;

    async fn create_campaign(
        &self,
        signer: &SignerHandle,
        args: CreateCampaignArgs,
    ) -> Result<Box<dyn TransactionHandle>, GatewayError> {
        let contract = self.with_signer(signer);
        let call = contract
            .createCampaign(
                args.owner,
                args.title,
                args.description,
                args.target,
                args.deadline,
            )
            .from(signer.account());
        self.submitter.submit("createCampaign", call).await
    }

    async fn get_campaigns(&self) -> Result<Vec<RawCampaign>, GatewayError> {
        let campaigns = self
            .contract
            .getCampaigns()
            .call()
            .await
            .map_err(|e| GatewayError::from_contract("getCampaigns", e))?;
        debug!(count = campaigns.len(), "fetched campaigns");
        Ok(campaigns.into_iter().map(RawCampaign::from).collect())
    }

    async fn donate_to_campaign(
        &self,
        signer: &SignerHandle,
        campaign_id: U256,
        value: U256,
    ) -> Result<Box<dyn TransactionHandle>, GatewayError> {
        let contract = self.with_signer(signer);
        let call = contract
            .donateToCampaign(campaign_id)
            .value(value)
            .from(signer.account());
        self.submitter.submit("donateToCampaign", call).await
    }

    async fn get_donators(
        &self,
        campaign_id: U256,
    ) -> Result<(Vec<Address>, Vec<U256>), GatewayError> {
        let result = self
            .contract
            .getDonators(campaign_id)
            .call()
            .await
            .map_err(|e| GatewayError::from_contract("getDonators", e))?;
        Ok((result.donators, result.donations))
    }
}
