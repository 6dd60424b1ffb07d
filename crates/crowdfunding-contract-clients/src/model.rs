use crate::error::GatewayError;
use crate::units::{deadline_from_chain, format_amount};
use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use std::time::SystemTime;

/// Campaign record exactly as the contract returns it, amounts in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCampaign {
    pub owner: Address,
    pub title: String,
    pub description: String,
    pub target: U256,
    pub deadline: U256,
    pub amount_collected: U256,
}

/// Campaign in display form.
///
/// `p_id` is the campaign's index in the contract's `getCampaigns()` listing.
/// It is only meaningful for the listing it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub owner: Address,
    pub title: String,
    pub description: String,
    pub target: String,
    /// Milliseconds since the Unix epoch.
    pub deadline: u64,
    pub amount_collected: String,
    #[serde(rename = "pId")]
    pub p_id: usize,
}

impl Campaign {
    pub fn from_raw(p_id: usize, raw: RawCampaign) -> Result<Self, GatewayError> {
        Ok(Self {
            owner: raw.owner,
            title: raw.title,
            description: raw.description,
            target: format_amount(raw.target),
            deadline: deadline_from_chain(raw.deadline)?,
            amount_collected: format_amount(raw.amount_collected),
            p_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Donation {
    pub donator: Address,
    pub amount: String,
}

/// User input for a new campaign.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    /// Decimal ether amount, e.g. `"2.5"`.
    pub target: String,
    pub deadline: SystemTime,
}

/// Arguments of the contract's `createCampaign` call, already in base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCampaignArgs {
    pub owner: Address,
    pub title: String,
    pub description: String,
    pub target: U256,
    pub deadline: U256,
}

/// Receipt summary of a confirmed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Published after a write is confirmed so observers can refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignEvent {
    Created { tx_hash: B256 },
    Donated { p_id: usize, tx_hash: B256 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_campaign_serializes_with_front_end_field_names() {
        let campaign = Campaign {
            owner: address!("0x000000000000000000000000000000000000000a"),
            title: "T".to_string(),
            description: "D".to_string(),
            target: "2.0".to_string(),
            deadline: 1_700_000_000_000,
            amount_collected: "0.0".to_string(),
            p_id: 0,
        };

        let json = serde_json::to_value(&campaign).unwrap();
        assert_eq!(json["target"], "2.0");
        assert_eq!(json["amountCollected"], "0.0");
        assert_eq!(json["deadline"], 1_700_000_000_000u64);
        assert_eq!(json["pId"], 0);
        assert!(json.get("p_id").is_none());
    }

    #[test]
    fn test_from_raw_rejects_oversized_deadline() {
        let raw = RawCampaign {
            owner: Address::ZERO,
            title: String::new(),
            description: String::new(),
            target: U256::ZERO,
            deadline: U256::MAX,
            amount_collected: U256::ZERO,
        };

        assert!(matches!(
            Campaign::from_raw(0, raw),
            Err(GatewayError::InvalidResponse(_))
        ));
    }
}
