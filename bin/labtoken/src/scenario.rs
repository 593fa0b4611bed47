//! Scripted transfer scenarios.
//!
//! A scenario is a TOML list of transfers between devnet accounts, each with
//! an optional expected outcome:
//!
//! ```toml
//! [[transfer]]
//! from = 0
//! to = 1            # account index or 0x address
//! amount = "10"     # decimal token units
//! expect = "OK"     # or AMOUNT_ZERO / ZERO_ADDRESS / INSUFFICIENT_BALANCE
//! ```

use alloy_primitives::{Address, U256};
use devnet::{Devnet, Receipt};
use ledger::StateSummary;
use serde::Deserialize;
use std::{path::Path, str::FromStr};
use tracing::{info, warn};

use crate::{account_balances, metrics::Metrics};

/// Outcome label for a successful transfer.
pub const OK: &str = "OK";

/// A transfer counterparty: a devnet account index or a raw address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Party {
    Index(usize),
    Address(Address),
}

impl Party {
    /// Resolve to an address against the devnet's accounts.
    pub fn resolve(&self, devnet: &Devnet) -> eyre::Result<Address> {
        match self {
            Self::Index(index) => devnet
                .accounts()
                .get(*index)
                .map(|account| account.address())
                .ok_or_else(|| {
                    eyre::eyre!(
                        "No account #{} (devnet has {})",
                        index,
                        devnet.accounts().len()
                    )
                }),
            Self::Address(address) => Ok(*address),
        }
    }
}

impl FromStr for Party {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Ok(Self::Index(index));
        }

        let address = s
            .parse::<Address>()
            .map_err(|e| eyre::eyre!("Expected account index or address, got {:?}: {}", s, e))?;
        Ok(Self::Address(address))
    }
}

/// One scripted transfer.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioTransfer {
    /// Index of the sending account
    pub from: usize,
    /// Recipient
    pub to: Party,
    /// Amount in decimal token units
    pub amount: String,
    /// Expected outcome: `OK` or a revert reason
    #[serde(default)]
    pub expect: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(rename = "transfer", default)]
    pub transfers: Vec<ScenarioTransfer>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Result of one scripted transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub index: usize,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub receipt: Receipt,
    /// `OK` or the revert reason
    pub outcome: String,
    /// Expected outcome, if the scenario gave one
    pub expected: Option<String>,
}

impl TransferOutcome {
    pub fn matches_expectation(&self) -> bool {
        self.expected
            .as_ref()
            .is_none_or(|expected| *expected == self.outcome)
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub outcomes: Vec<TransferOutcome>,
    /// Final balance of every devnet account, in account order
    pub balances: Vec<(Address, U256)>,
    pub summary: StateSummary,
}

impl ScenarioReport {
    /// Transfers whose outcome differed from the expectation.
    pub fn mismatches(&self) -> impl Iterator<Item = &TransferOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.matches_expectation())
    }
}

/// Execute every transfer in order, waiting for each receipt before
/// submitting the next, then verify the ledger invariants.
pub async fn run_scenario(
    devnet: &Devnet,
    scenario: &Scenario,
    metrics: &Metrics,
) -> eyre::Result<ScenarioReport> {
    let mut outcomes = Vec::with_capacity(scenario.transfers.len());

    for (index, step) in scenario.transfers.iter().enumerate() {
        let caller = devnet.accounts().get(step.from).ok_or_else(|| {
            eyre::eyre!("Transfer #{}: no sending account #{}", index, step.from)
        })?;
        let to = step.to.resolve(devnet)?;
        let token = devnet.token(caller);
        let amount = token.parse_units(&step.amount)?;

        let receipt = token.transfer(to, amount).await?.wait().await?;
        metrics.record_transfer(&receipt);

        let outcome = TransferOutcome {
            index,
            from: caller.address(),
            to,
            amount,
            outcome: receipt.revert_reason().unwrap_or_else(|| OK.to_string()),
            expected: step.expect.clone(),
            receipt,
        };

        if outcome.matches_expectation() {
            info!(
                index,
                from = %outcome.from,
                to = %outcome.to,
                amount = %token.format_units(amount),
                outcome = %outcome.outcome,
                gas_used = outcome.receipt.gas_used,
                "Transfer executed"
            );
        } else {
            warn!(
                index,
                from = %outcome.from,
                to = %outcome.to,
                amount = %token.format_units(amount),
                outcome = %outcome.outcome,
                expected = ?outcome.expected,
                "Transfer outcome did not match expectation"
            );
        }

        outcomes.push(outcome);
    }

    let summary = devnet.node().check_invariants().await?;
    metrics.set_holders(summary.holders);

    Ok(ScenarioReport {
        outcomes,
        balances: account_balances(devnet).await?,
        summary,
    })
}
