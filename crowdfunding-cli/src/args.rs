use alloy::primitives::Address;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::info;

/// Config file read when `--config` is not given, if it exists.
const DEFAULT_CONFIG_FILE: &str = "crowdfunding.toml";

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// CrowdFunding contract deployed first by Anvil account #0
const DEFAULT_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// CLI arguments for the crowdfunding front end
#[derive(Parser, Debug)]
#[command(name = "crowdfunding")]
#[command(about = "CrowdFunding CLI - Browse, create and fund campaigns", long_about = None)]
pub struct CliArgs {
    /// RPC URL for the Ethereum node
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Address of the CrowdFunding contract
    #[arg(long, env = "CROWDFUNDING_CONTRACT_ADDRESS")]
    pub contract_address: Option<String>,

    /// Private key of the wallet; without one no wallet is available
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Use the accounts managed by the node instead of a private key
    #[arg(long, env = "NODE_WALLET")]
    pub node_wallet: bool,

    /// Treat the private key's account as already authorized
    #[arg(long, env = "WALLET_AUTHORIZED")]
    pub authorized: bool,

    /// TOML config file
    #[arg(long, env = "CROWDFUNDING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the contract, endpoint and connected account
    Status,

    /// Request wallet access and show the connected account
    Connect,

    /// List all campaigns
    Campaigns,

    /// List campaigns owned by the connected account
    MyCampaigns,

    /// Create a new campaign
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Target in ether, e.g. 2.5
        #[arg(long)]
        target: String,

        /// Deadline as YYYY-MM-DD (UTC midnight) or RFC 3339
        #[arg(long, value_parser = parse_deadline)]
        deadline: SystemTime,
    },

    /// Donate to a campaign
    Donate {
        /// Campaign id as shown by `campaigns`
        #[arg(long = "campaign")]
        p_id: usize,

        /// Amount in ether
        #[arg(long)]
        amount: String,
    },

    /// List the donations made to a campaign
    Donations {
        /// Campaign id as shown by `campaigns`
        #[arg(long = "campaign")]
        p_id: usize,
    },
}

/// Values read from the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
    pub private_key: Option<String>,
    pub node_wallet: Option<bool>,
    pub authorized: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Front-end configuration with all values resolved
#[derive(Debug, Clone)]
pub struct CrowdfundingConfig {
    pub rpc_url: String,
    pub contract_address: Address,
    pub private_key: Option<String>,
    pub node_wallet: bool,
    pub pre_authorized: bool,
}

impl CrowdfundingConfig {
    /// Load configuration with priority: CLI/env -> config file -> defaults
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        let file = match &cli_args.config {
            Some(path) => FileConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };
        Self::resolve(cli_args, file)
    }

    fn resolve(cli_args: &CliArgs, file: FileConfig) -> Result<Self> {
        let rpc_url = cli_args
            .rpc_url
            .clone()
            .or(file.rpc_url)
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let contract_address = cli_args
            .contract_address
            .clone()
            .or(file.contract_address)
            .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string())
            .parse::<Address>()
            .context("Invalid CrowdFunding contract address")?;

        let private_key = cli_args.private_key.clone().or(file.private_key);
        let node_wallet = cli_args.node_wallet || file.node_wallet.unwrap_or(false);
        let pre_authorized = cli_args.authorized || file.authorized.unwrap_or(false);

        info!(
            "Loaded CrowdfundingConfig: rpc_url={rpc_url}, contract={contract_address}, node_wallet={node_wallet}, key_configured={}",
            private_key.is_some()
        );

        Ok(Self {
            rpc_url,
            contract_address,
            private_key,
            node_wallet,
            pre_authorized,
        })
    }
}

/// Parse a deadline given as a calendar date or an RFC 3339 timestamp.
fn parse_deadline(input: &str) -> Result<SystemTime, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(SystemTime::from(timestamp));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD or RFC 3339 ({e})"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid date {input}"))?;
    Ok(SystemTime::from(midnight.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("crowdfunding").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_parse_deadline_date() {
        let deadline = parse_deadline("2023-11-14").unwrap();
        assert_eq!(deadline, UNIX_EPOCH + Duration::from_secs(1_699_920_000));
    }

    #[test]
    fn test_parse_deadline_rfc3339() {
        let deadline = parse_deadline("2023-11-14T22:13:20Z").unwrap();
        assert_eq!(deadline, UNIX_EPOCH + Duration::from_millis(1_700_000_000_000));
    }

    #[test]
    fn test_parse_deadline_invalid() {
        assert!(parse_deadline("next week").is_err());
    }

    #[test]
    fn test_parse_donate_command() {
        let args = parse(&["--json", "donate", "--campaign", "3", "--amount", "0.5"]);
        assert!(args.json);
        match args.command {
            Command::Donate { p_id, amount } => {
                assert_eq!(p_id, 3);
                assert_eq!(amount, "0.5");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let args = parse(&["campaigns"]);
        let config = CrowdfundingConfig::resolve(&args, FileConfig::default()).unwrap();

        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(
            config.contract_address,
            DEFAULT_CONTRACT_ADDRESS.parse::<Address>().unwrap()
        );
        assert!(config.private_key.is_none());
        assert!(!config.node_wallet);
    }

    #[test]
    fn test_cli_overrides_file() {
        let args = parse(&["--rpc-url", "http://node:8545", "campaigns"]);
        let file: FileConfig = toml::from_str(
            r#"
            rpc_url = "http://file:8545"
            contract_address = "0x89c1312Cedb0B0F67e4913D2076bd4a860652B69"
            authorized = true
            "#,
        )
        .unwrap();

        let config = CrowdfundingConfig::resolve(&args, file).unwrap();

        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(
            config.contract_address,
            "0x89c1312Cedb0B0F67e4913D2076bd4a860652B69"
                .parse::<Address>()
                .unwrap()
        );
        assert!(config.pre_authorized);
    }

    #[test]
    fn test_invalid_contract_address() {
        let args = parse(&["--contract-address", "0x1234", "campaigns"]);
        assert!(CrowdfundingConfig::resolve(&args, FileConfig::default()).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join("crowdfunding_test_config.toml");
        fs::write(&path, "node_wallet = true\n").unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.node_wallet, Some(true));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unknown_config_key_is_rejected() {
        assert!(toml::from_str::<FileConfig>("slot_ms = 5000").is_err());
    }
}
