use alloy::primitives::{Address, U256};
use anyhow::Result;
use chrono::{DateTime, Utc};
use crowdfunding_contract_clients::{Campaign, Confirmation, Donation};
use serde::Serialize;
use term_table::row::Row;
use term_table::table_cell::{Alignment, TableCell};
use term_table::{Table, TableStyle};

/// Prints results either as tables or as pretty JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status<'a> {
    title: &'a str,
    rpc_url: &'a str,
    contract: Address,
    account: Option<Address>,
    campaign_count: U256,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn campaigns(&self, campaigns: &[Campaign]) -> Result<()> {
        if self.json {
            return print_json(&campaigns);
        }
        if campaigns.is_empty() {
            println!("No campaigns found");
        } else {
            println!("{}", render_campaigns(campaigns));
        }
        Ok(())
    }

    pub fn donations(&self, p_id: usize, donations: &[Donation]) -> Result<()> {
        if self.json {
            return print_json(&donations);
        }
        if donations.is_empty() {
            println!("No donations to campaign {p_id} yet");
        } else {
            println!("{}", render_donations(donations));
        }
        Ok(())
    }

    pub fn confirmation(&self, action: &str, confirmation: &Confirmation) -> Result<()> {
        if self.json {
            return print_json(confirmation);
        }
        println!("{action} confirmed");
        println!("Transaction hash: {:?}", confirmation.tx_hash);
        if let Some(block) = confirmation.block_number {
            println!("Block: {block}");
        }
        Ok(())
    }

    pub fn account(&self, account: Address) -> Result<()> {
        if self.json {
            return print_json(&account);
        }
        println!("Connected account: {account}");
        Ok(())
    }

    pub fn status(
        &self,
        title: &str,
        rpc_url: &str,
        contract: Address,
        account: Option<Address>,
        campaign_count: U256,
    ) -> Result<()> {
        let status = Status {
            title,
            rpc_url,
            contract,
            account,
            campaign_count,
        };
        if self.json {
            return print_json(&status);
        }
        println!("{}", render_status(&status));
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cell(text: impl ToString) -> TableCell {
    TableCell::builder(text.to_string())
        .alignment(Alignment::Left)
        .build()
}

fn header(cells: &[&str]) -> Row {
    Row::new(
        cells
            .iter()
            .map(|text| {
                TableCell::builder(*text)
                    .alignment(Alignment::Center)
                    .build()
            })
            .collect::<Vec<_>>(),
    )
}

/// Format an epoch-milliseconds deadline as a UTC date.
fn format_deadline(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|deadline| deadline.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn render_campaigns(campaigns: &[Campaign]) -> String {
    let mut table = Table::new();
    table.style = TableStyle::extended();
    table.add_row(header(&[
        "pId", "Title", "Owner", "Target", "Collected", "Deadline",
    ]));

    for campaign in campaigns {
        table.add_row(Row::new(vec![
            cell(campaign.p_id),
            cell(&campaign.title),
            cell(campaign.owner),
            cell(format!("{} ETH", campaign.target)),
            cell(format!("{} ETH", campaign.amount_collected)),
            cell(format_deadline(campaign.deadline)),
        ]));
    }

    table.render()
}

fn render_donations(donations: &[Donation]) -> String {
    let mut table = Table::new();
    table.style = TableStyle::extended();
    table.add_row(header(&["Donator", "Amount"]));

    for donation in donations {
        table.add_row(Row::new(vec![
            cell(donation.donator),
            cell(format!("{} ETH", donation.amount)),
        ]));
    }

    table.render()
}

fn render_status(status: &Status<'_>) -> String {
    let mut table = Table::new();
    table.style = TableStyle::extended();

    table.add_row(Row::new(vec![
        TableCell::builder(status.title)
            .col_span(2)
            .alignment(Alignment::Center)
            .build(),
    ]));

    let account = status
        .account
        .map(|account| account.to_string())
        .unwrap_or_else(|| "not connected".to_string());
    let rows = [
        ("RPC URL", status.rpc_url.to_string()),
        ("Contract", status.contract.to_string()),
        ("Account", account),
        ("Campaigns", status.campaign_count.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(Row::new(vec![
            TableCell::builder(label)
                .alignment(Alignment::Right)
                .build(),
            cell(value),
        ]));
    }

    table.render()
}
