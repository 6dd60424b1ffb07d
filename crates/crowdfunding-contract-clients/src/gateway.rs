use crate::{
    endpoint::{ContractEndpoint, TransactionHandle},
    error::GatewayError,
    model::{Campaign, CampaignEvent, Confirmation, CreateCampaignArgs, Donation, NewCampaign},
    session::SessionAccount,
    units::{deadline_millis, format_amount, parse_amount},
    wallet::WalletConnector,
};
use alloy::primitives::{Address, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Display title of the crowdfunding front end.
pub const TITLE: &str = "Crowd Funding Contract";

const EVENT_CAPACITY: usize = 16;

/// Facade over one deployed CrowdFunding contract.
///
/// Every operation returns its failure to the caller; nothing is swallowed.
/// Writes publish a [`CampaignEvent`] once confirmed.
pub struct CrowdFundingGateway<W, E> {
    wallet: W,
    endpoint: E,
    session: SessionAccount,
    events: broadcast::Sender<CampaignEvent>,
    wallet_checked: AtomicBool,
}

impl<W, E> CrowdFundingGateway<W, E>
where
    W: WalletConnector,
    E: ContractEndpoint<Signer = W::Signer>,
{
    pub fn new(wallet: W, endpoint: E, session: SessionAccount) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            wallet,
            endpoint,
            session,
            events,
            wallet_checked: AtomicBool::new(false),
        }
    }

    pub fn title(&self) -> &'static str {
        TITLE
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn session_account(&self) -> Option<Address> {
        self.session.get()
    }

    /// Receive a notification after every confirmed write.
    pub fn subscribe(&self) -> broadcast::Receiver<CampaignEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------------
    // Wallet
    // ------------------------------------------------------------------------

    /// Ask the wallet for access and record the first account as the session.
    pub async fn connect_wallet(&self) -> Result<Address, GatewayError> {
        let accounts = self.wallet.request_accounts().await.inspect_err(|e| {
            warn!(error = %e, "wallet connection failed");
        })?;

        let Some(&account) = accounts.first() else {
            warn!("wallet returned no accounts");
            return Err(GatewayError::UserRejected);
        };

        self.session.set(account);
        info!(account = %account, "wallet connected");
        Ok(account)
    }

    /// Pick up an account the wallet already authorized, without prompting.
    ///
    /// Only the first call queries the wallet; later calls return the current
    /// session unchanged.
    pub async fn check_if_wallet_connected(&self) -> Result<Option<Address>, GatewayError> {
        if self.wallet_checked.swap(true, Ordering::SeqCst) {
            return Ok(self.session.get());
        }

        let accounts = self
            .wallet
            .list_authorized_accounts()
            .await
            .inspect_err(|e| warn!(error = %e, "wallet check failed"))?;

        match accounts.first() {
            Some(&account) => {
                self.session.set(account);
                info!(account = %account, "wallet already connected");
                Ok(Some(account))
            }
            None => {
                info!("no authorized account found");
                Ok(None)
            }
        }
    }

    fn require_session(&self) -> Result<Address, GatewayError> {
        self.session.get().ok_or(GatewayError::NotConnected)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    pub async fn create_campaign(&self, campaign: NewCampaign) -> Result<Confirmation, GatewayError> {
        let owner = self.require_session()?;
        let target = parse_amount(&campaign.target)?;
        let deadline = deadline_millis(campaign.deadline)?;

        let signer = self.wallet.signing_handle(owner).await?;
        let args = CreateCampaignArgs {
            owner,
            title: campaign.title,
            description: campaign.description,
            target,
            deadline,
        };

        info!(
            owner = %owner,
            target = %campaign.target,
            deadline = %deadline,
            "creating campaign"
        );
        let confirmation = self
            .confirm(self.endpoint.create_campaign(&signer, args).await)
            .await
            .inspect_err(|e| warn!(error = %e, "campaign creation failed"))?;

        self.publish(CampaignEvent::Created {
            tx_hash: confirmation.tx_hash,
        });
        Ok(confirmation)
    }

    pub async fn donate(&self, p_id: usize, amount: &str) -> Result<Confirmation, GatewayError> {
        let donator = self.require_session()?;
        let value = parse_amount(amount)?;

        let signer = self.wallet.signing_handle(donator).await?;

        info!(p_id, amount, "donating to campaign");
        let confirmation = self
            .confirm(
                self.endpoint
                    .donate_to_campaign(&signer, U256::from(p_id), value)
                    .await,
            )
            .await
            .inspect_err(|e| warn!(p_id, error = %e, "donation failed"))?;

        self.publish(CampaignEvent::Donated {
            p_id,
            tx_hash: confirmation.tx_hash,
        });
        Ok(confirmation)
    }

    async fn confirm(
        &self,
        submitted: Result<Box<dyn TransactionHandle>, GatewayError>,
    ) -> Result<Confirmation, GatewayError> {
        let pending = submitted?;
        info!(tx_hash = ?pending.tx_hash(), "awaiting confirmation");
        pending.await_confirmation().await
    }

    fn publish(&self, event: CampaignEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// All campaigns, each tagged with its index in the contract's listing.
    pub async fn get_campaigns(&self) -> Result<Vec<Campaign>, GatewayError> {
        self.endpoint
            .get_campaigns()
            .await?
            .into_iter()
            .enumerate()
            .map(|(p_id, raw)| Campaign::from_raw(p_id, raw))
            .collect()
    }

    /// Campaigns owned by the session account. Empty when no account is connected.
    ///
    /// Identifiers are the same as in [`Self::get_campaigns`], so they can be
    /// passed to [`Self::donate`] and [`Self::get_donations`].
    pub async fn get_user_campaigns(&self) -> Result<Vec<Campaign>, GatewayError> {
        let Some(account) = self.session.get() else {
            return Ok(Vec::new());
        };

        let campaigns = self.get_campaigns().await?;
        Ok(campaigns
            .into_iter()
            .filter(|campaign| campaign.owner == account)
            .collect())
    }

    pub async fn get_donations(&self, p_id: usize) -> Result<Vec<Donation>, GatewayError> {
        let (donators, amounts) = self.endpoint.get_donators(U256::from(p_id)).await?;

        if donators.len() != amounts.len() {
            return Err(GatewayError::DonationsMismatch {
                donators: donators.len(),
                amounts: amounts.len(),
            });
        }

        Ok(donators
            .into_iter()
            .zip(amounts)
            .map(|(donator, amount)| Donation {
                donator,
                amount: format_amount(amount),
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
