use crate::error::{GatewayError, METHOD_NOT_FOUND_CODE};
use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::RpcError,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Resolves the user's account and hands out transaction signers.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    type Signer: Send + Sync;

    /// Ask the wallet for account access. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, GatewayError>;

    /// Accounts the wallet has already authorized. Never prompts.
    async fn list_authorized_accounts(&self) -> Result<Vec<Address>, GatewayError>;

    /// A fresh signer for one write, sending from `account`.
    ///
    /// Fails with [`GatewayError::NotConnected`] when the wallet does not hold `account`.
    async fn signing_handle(&self, account: Address) -> Result<Self::Signer, GatewayError>;
}

/// Signing connection returned by the alloy-backed wallets.
#[derive(Clone)]
pub struct SignerHandle {
    account: Address,
    provider: DynProvider,
}

impl SignerHandle {
    pub fn new(account: Address, provider: DynProvider) -> Self {
        Self { account, provider }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

// ============================================================================
// Local key wallet
// ============================================================================

/// Wallet backed by a private key held by this process.
///
/// Without a key there is no wallet provider at all. The key's account only
/// shows up in [`WalletConnector::list_authorized_accounts`] after
/// [`WalletConnector::request_accounts`] or when created pre-authorized.
pub struct LocalKeyWallet {
    rpc_url: String,
    signer: Option<PrivateKeySigner>,
    authorized: AtomicBool,
}

impl LocalKeyWallet {
    pub fn new(
        rpc_url: String,
        private_key: Option<&str>,
        pre_authorized: bool,
    ) -> Result<Self, GatewayError> {
        let signer = private_key
            .map(|key| {
                key.parse::<PrivateKeySigner>()
                    .map_err(|e| GatewayError::InvalidPrivateKey(e.to_string()))
            })
            .transpose()?;

        Ok(Self {
            rpc_url,
            signer,
            authorized: AtomicBool::new(pre_authorized),
        })
    }

    /// Wallet with no key configured.
    pub fn unavailable(rpc_url: String) -> Self {
        Self {
            rpc_url,
            signer: None,
            authorized: AtomicBool::new(false),
        }
    }

    fn signer(&self) -> Result<&PrivateKeySigner, GatewayError> {
        self.signer.as_ref().ok_or(GatewayError::WalletUnavailable)
    }
}

#[async_trait]
impl WalletConnector for LocalKeyWallet {
    type Signer = SignerHandle;

    async fn request_accounts(&self) -> Result<Vec<Address>, GatewayError> {
        let account = self.signer()?.address();
        self.authorized.store(true, Ordering::SeqCst);
        Ok(vec![account])
    }

    async fn list_authorized_accounts(&self) -> Result<Vec<Address>, GatewayError> {
        let account = self.signer()?.address();
        if self.authorized.load(Ordering::SeqCst) {
            Ok(vec![account])
        } else {
            Ok(Vec::new())
        }
    }

    async fn signing_handle(&self, account: Address) -> Result<SignerHandle, GatewayError> {
        let signer = self.signer()?.clone();
        if signer.address() != account {
            return Err(GatewayError::NotConnected);
        }
        let wallet = EthereumWallet::from(signer);

        // Build a provider that can sign transactions, then erase the concrete type
        let provider: DynProvider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(&self.rpc_url)
            .await
            .map_err(|e| GatewayError::from_transport(&e))?
            .erased();

        debug!(account = %account, "signing provider connected");
        Ok(SignerHandle::new(account, provider))
    }
}

// ============================================================================
// Node-managed wallet
// ============================================================================

/// Wallet whose accounts live in the connected node, as with browser wallets
/// or a development node with unlocked accounts.
///
/// Uses `eth_requestAccounts` and `eth_accounts`, and signs through
/// `eth_sendTransaction`.
pub struct NodeWallet {
    rpc_url: String,
}

impl NodeWallet {
    pub fn new(rpc_url: String) -> Self {
        Self { rpc_url }
    }

    async fn connect(&self) -> Result<DynProvider, GatewayError> {
        if self.rpc_url.is_empty() {
            return Err(GatewayError::WalletUnavailable);
        }

        match ProviderBuilder::new().connect(&self.rpc_url).await {
            Ok(provider) => Ok(provider.erased()),
            Err(e) => {
                warn!(rpc_url = %self.rpc_url, error = %e, "wallet provider unreachable");
                Err(GatewayError::WalletUnavailable)
            }
        }
    }
}

#[async_trait]
impl WalletConnector for NodeWallet {
    type Signer = SignerHandle;

    async fn request_accounts(&self) -> Result<Vec<Address>, GatewayError> {
        let provider = self.connect().await?;
        let result = provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await;

        match result {
            Ok(accounts) => Ok(accounts),
            // Plain nodes have no prompt; their accounts are authorized already
            Err(RpcError::ErrorResp(payload)) if payload.code == METHOD_NOT_FOUND_CODE => provider
                .get_accounts()
                .await
                .map_err(|e| GatewayError::from_transport(&e)),
            Err(e) => Err(GatewayError::from_transport(&e)),
        }
    }

    async fn list_authorized_accounts(&self) -> Result<Vec<Address>, GatewayError> {
        let provider = self.connect().await?;
        provider
            .get_accounts()
            .await
            .map_err(|e| GatewayError::from_transport(&e))
    }

    async fn signing_handle(&self, account: Address) -> Result<SignerHandle, GatewayError> {
        let provider = self.connect().await?;
        let accounts = provider
            .get_accounts()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;
        if !accounts.contains(&account) {
            warn!(account = %account, "account not managed by the node");
            return Err(GatewayError::NotConnected);
        }

        debug!(account = %account, "node signing provider connected");
        Ok(SignerHandle::new(account, provider))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::env;

    const ANVIL_KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const ANVIL_ADDRESS_1: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn rpc_url() -> String {
        env::var("TEST_RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string())
    }

    #[tokio::test]
    async fn test_missing_key_is_wallet_unavailable() {
        let wallet = LocalKeyWallet::unavailable(rpc_url());

        assert!(matches!(
            wallet.request_accounts().await,
            Err(GatewayError::WalletUnavailable)
        ));
        assert!(matches!(
            wallet.list_authorized_accounts().await,
            Err(GatewayError::WalletUnavailable)
        ));
        assert!(matches!(
            wallet.signing_handle(ANVIL_ADDRESS_1).await,
            Err(GatewayError::WalletUnavailable)
        ));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let result = LocalKeyWallet::new(rpc_url(), Some("not-a-key"), false);
        assert!(matches!(result, Err(GatewayError::InvalidPrivateKey(_))));
    }

    #[tokio::test]
    async fn test_request_authorizes_account() {
        let wallet = LocalKeyWallet::new(rpc_url(), Some(ANVIL_KEY_1), false).unwrap();

        assert!(wallet.list_authorized_accounts().await.unwrap().is_empty());
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![ANVIL_ADDRESS_1]);
        assert_eq!(
            wallet.list_authorized_accounts().await.unwrap(),
            vec![ANVIL_ADDRESS_1]
        );
    }

    #[tokio::test]
    async fn test_pre_authorized_account_is_listed() {
        // Key without the 0x prefix
        let wallet = LocalKeyWallet::new(rpc_url(), Some(&ANVIL_KEY_1[2..]), true).unwrap();

        assert_eq!(
            wallet.list_authorized_accounts().await.unwrap(),
            vec![ANVIL_ADDRESS_1]
        );
    }

    #[tokio::test]
    async fn test_signing_handle_only_for_own_account() {
        let wallet = LocalKeyWallet::new(rpc_url(), Some(ANVIL_KEY_1), true).unwrap();

        assert!(matches!(
            wallet.signing_handle(Address::ZERO).await,
            Err(GatewayError::NotConnected)
        ));

        let handle = wallet.signing_handle(ANVIL_ADDRESS_1).await.unwrap();
        assert_eq!(handle.account(), ANVIL_ADDRESS_1);
    }

    #[tokio::test]
    async fn test_node_wallet_without_url_is_unavailable() {
        let wallet = NodeWallet::new(String::new());
        assert!(matches!(
            wallet.list_authorized_accounts().await,
            Err(GatewayError::WalletUnavailable)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires a running Ethereum node with unlocked accounts (e.g. Anvil)
    async fn test_node_wallet_lists_dev_accounts() {
        let wallet = NodeWallet::new(rpc_url());

        let accounts = wallet.request_accounts().await.unwrap();
        assert!(!accounts.is_empty());

        let last = *accounts.last().unwrap();
        let handle = wallet.signing_handle(last).await.unwrap();
        assert_eq!(handle.account(), last);

        assert!(matches!(
            wallet.signing_handle(Address::ZERO).await,
            Err(GatewayError::NotConnected)
        ));
    }
}
