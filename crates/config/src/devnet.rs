//! Local devnet configuration.

use serde::{Deserialize, Serialize};

use crate::{gas::GasSchedule, token::TokenConfig};

/// Chain ID used by local development chains.
pub const DEVNET_CHAIN_ID: u64 = 31337;

/// Number of funded signer accounts generated by default.
pub const DEFAULT_ACCOUNTS: usize = 5;

/// Complete configuration of a local devnet running one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevnetConfig {
    /// Number of signer accounts to generate; account 0 deploys the token
    pub accounts: usize,
    /// Chain ID mixed into transaction signing hashes
    pub chain_id: u64,
    /// Token parameters
    pub token: TokenConfig,
    /// Gas schedule used for receipts and estimates
    pub gas: GasSchedule,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            chain_id: DEVNET_CHAIN_ID,
            token: TokenConfig::default(),
            gas: GasSchedule::mainnet(),
        }
    }
}

/// Builder for custom devnet configurations.
#[derive(Debug, Clone, Default)]
pub struct DevnetConfigBuilder {
    config: DevnetConfig,
}

impl DevnetConfigBuilder {
    /// Start with devnet defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the number of generated accounts.
    pub fn accounts(mut self, accounts: usize) -> Self {
        self.config.accounts = accounts;
        self
    }

    /// Override the chain ID.
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.chain_id = chain_id;
        self
    }

    /// Override the initial supply (whole token units).
    pub fn initial_supply(mut self, supply: impl Into<String>) -> Self {
        self.config.token.initial_supply = supply.into();
        self
    }

    /// Override the token decimals.
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.config.token.decimals = decimals;
        self
    }

    /// Override the token name and symbol.
    pub fn named(mut self, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.config.token.name = name.into();
        self.config.token.symbol = symbol.into();
        self
    }

    /// Override the gas schedule.
    pub fn gas(mut self, gas: GasSchedule) -> Self {
        self.config.gas = gas;
        self
    }

    /// Build the devnet configuration.
    pub fn build(self) -> DevnetConfig {
        self.config
    }
}
