use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{Context, Result};
use args::{CliArgs, Command, CrowdfundingConfig};
use clap::Parser;
use crowdfunding_contract_clients::{
    CampaignEvent, ContractConfig, CrowdFundingClient, CrowdFundingGateway, GatewayError,
    LocalKeyWallet, NewCampaign, NodeWallet, SessionAccount, SignerHandle, WalletConnector,
};
use output::Output;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod output;

type Gateway<W> = CrowdFundingGateway<W, CrowdFundingClient<DynProvider>>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli_args = CliArgs::parse();
    let config = CrowdfundingConfig::load(&cli_args)?;
    let output = Output::new(cli_args.json);

    let endpoint = setup_endpoint(&config).await?;
    let session = SessionAccount::new();

    if config.node_wallet {
        let wallet = NodeWallet::new(config.rpc_url.clone());
        let gateway = CrowdFundingGateway::new(wallet, endpoint, session.clone());
        run(&gateway, &session, &config, cli_args.command, output).await
    } else {
        let wallet = LocalKeyWallet::new(
            config.rpc_url.clone(),
            config.private_key.as_deref(),
            config.pre_authorized,
        )?;
        let gateway = CrowdFundingGateway::new(wallet, endpoint, session.clone());
        run(&gateway, &session, &config, cli_args.command, output).await
    }
}

fn init_tracing() {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(true))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

async fn setup_endpoint(config: &CrowdfundingConfig) -> Result<CrowdFundingClient<DynProvider>> {
    let provider: DynProvider = ProviderBuilder::new()
        .connect(&config.rpc_url)
        .await
        .with_context(|| format!("Failed to connect to RPC endpoint {}", config.rpc_url))?
        .erased();

    let contract_config = ContractConfig::new(config.rpc_url.clone(), config.contract_address);
    let client = CrowdFundingClient::new(provider, &contract_config);

    info!(contract = %client.address(), rpc_url = %config.rpc_url, "Connected to contract");
    Ok(client)
}

async fn run<W>(
    gateway: &Gateway<W>,
    session: &SessionAccount,
    config: &CrowdfundingConfig,
    command: Command,
    output: Output,
) -> Result<()>
where
    W: WalletConnector<Signer = SignerHandle>,
{
    // Pick up an already authorized account before doing anything else
    if let Err(e) = gateway.check_if_wallet_connected().await {
        warn!(error = %e, "Wallet not available");
    }

    match command {
        Command::Status => {
            let count = gateway.endpoint().campaign_count().await?;
            output.status(
                gateway.title(),
                &config.rpc_url,
                gateway.endpoint().address(),
                gateway.session_account(),
                count,
            )
        }
        Command::Connect => {
            let account = gateway.connect_wallet().await?;
            output.account(account)
        }
        Command::Campaigns => output.campaigns(&gateway.get_campaigns().await?),
        Command::MyCampaigns => {
            if !session.is_set() {
                warn!("No wallet account connected; use `connect` or --authorized");
            }
            output.campaigns(&gateway.get_user_campaigns().await?)
        }
        Command::Create {
            title,
            description,
            target,
            deadline,
        } => {
            ensure_session(gateway, session).await?;
            let mut events = gateway.subscribe();
            let confirmation = gateway
                .create_campaign(NewCampaign {
                    title,
                    description,
                    target,
                    deadline,
                })
                .await
                .inspect_err(report_write_failure)?;
            output.confirmation("Campaign creation", &confirmation)?;
            refresh(gateway, &mut events, output).await
        }
        Command::Donate { p_id, amount } => {
            ensure_session(gateway, session).await?;
            let mut events = gateway.subscribe();
            let confirmation = gateway
                .donate(p_id, &amount)
                .await
                .inspect_err(report_write_failure)?;
            output.confirmation("Donation", &confirmation)?;
            refresh(gateway, &mut events, output).await
        }
        Command::Donations { p_id } => output.donations(p_id, &gateway.get_donations(p_id).await?),
    }
}

/// Writes need a connected account; ask the wallet if none was authorized yet.
async fn ensure_session<W>(gateway: &Gateway<W>, session: &SessionAccount) -> Result<()>
where
    W: WalletConnector<Signer = SignerHandle>,
{
    if !session.is_set() {
        let account = gateway
            .connect_wallet()
            .await
            .context("A connected wallet is required for this command")?;
        info!(account = %account, "Wallet connected");
    }
    Ok(())
}

fn report_write_failure(error: &GatewayError) {
    if error.is_chain() {
        warn!("The contract rejected the transaction; nothing was changed");
    }
}

/// Re-read whatever the confirmed writes changed.
async fn refresh<W>(
    gateway: &Gateway<W>,
    events: &mut broadcast::Receiver<CampaignEvent>,
    output: Output,
) -> Result<()>
where
    W: WalletConnector<Signer = SignerHandle>,
{
    while let Ok(event) = events.try_recv() {
        info!(?event, "Campaigns changed, refreshing");
        match event {
            CampaignEvent::Created { .. } => output.campaigns(&gateway.get_user_campaigns().await?)?,
            CampaignEvent::Donated { p_id, .. } => {
                output.donations(p_id, &gateway.get_donations(p_id).await?)?
            }
        }
    }
    Ok(())
}
