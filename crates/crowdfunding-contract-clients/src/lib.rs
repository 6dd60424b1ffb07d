use alloy::primitives::{Address, address};

pub mod common;
pub mod crowdfunding;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod model;
pub mod session;
pub mod units;
pub mod wallet;

// ============================================================================
// Re-exports
// ============================================================================

pub use crowdfunding::CrowdFundingClient;
pub use endpoint::{ContractEndpoint, TransactionHandle};
pub use error::GatewayError;
pub use gateway::CrowdFundingGateway;
pub use model::{
    Campaign, CampaignEvent, Confirmation, CreateCampaignArgs, Donation, NewCampaign, RawCampaign,
};
pub use session::SessionAccount;
pub use wallet::{LocalKeyWallet, NodeWallet, SignerHandle, WalletConnector};

// ============================================================================
// Contract Configuration
// ============================================================================

/// Configuration for connecting to the deployed CrowdFunding contract.
#[derive(Clone, Debug)]
pub struct ContractConfig {
    pub crowdfunding_contract_address: Address,
    pub rpc_url: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            crowdfunding_contract_address: Address::ZERO,
            rpc_url: String::new(),
        }
    }
}

impl ContractConfig {
    /// Create a new configuration for a deployed contract
    ///
    /// # Arguments
    /// * `rpc_url` - Ethereum RPC endpoint (HTTP or WebSocket)
    /// * `crowdfunding_contract_address` - Address of the deployed CrowdFunding contract
    pub fn new(rpc_url: String, crowdfunding_contract_address: Address) -> Self {
        Self {
            crowdfunding_contract_address,
            rpc_url,
        }
    }

    /// Create a configuration with Anvil local testnet defaults
    ///
    /// CrowdFunding is the first contract deployed by account #0 (nonce 0).
    pub fn anvil_config() -> Self {
        Self {
            crowdfunding_contract_address: address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            rpc_url: "http://127.0.0.1:8545".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let address = "0x89c1312Cedb0B0F67e4913D2076bd4a860652B69"
            .parse::<Address>()
            .unwrap();

        let config = ContractConfig::new("http://localhost:8545".to_string(), address);

        assert_eq!(config.crowdfunding_contract_address, address);
        assert_eq!(config.rpc_url, "http://localhost:8545");
    }

    #[test]
    fn test_anvil_config_address() {
        let expected = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            .parse::<Address>()
            .unwrap();
        assert_eq!(
            ContractConfig::anvil_config().crowdfunding_contract_address,
            expected
        );
    }
}
