//! Token parameters and amount conversion.
//!
//! The ledger only ever sees raw integer units. Everything human facing
//! (config files, scenario files, CLI flags) speaks decimal token amounts,
//! converted here using the token's `decimals`.

use alloy_primitives::{
    utils::{format_units, parse_units},
    U256,
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default number of decimal places, matching the ERC20 convention.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Token metadata and deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Number of decimal places used to scale human amounts
    pub decimals: u8,
    /// Initial supply in whole (decimal) token units, credited to the deployer
    pub initial_supply: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "LabToken".to_string(),
            symbol: "LAB".to_string(),
            decimals: DEFAULT_DECIMALS,
            initial_supply: "1000".to_string(),
        }
    }
}

impl TokenConfig {
    /// Parse a decimal token amount (e.g. `"10"`, `"0.5"`) into raw units.
    pub fn parse_amount(&self, amount: &str) -> Result<U256, ConfigError> {
        let trimmed = amount.trim();
        if trimmed.starts_with('-') {
            return Err(ConfigError::NegativeAmount(amount.to_string()));
        }

        parse_units(trimmed, self.decimals)
            .map(|units| units.get_absolute())
            .map_err(|e| ConfigError::InvalidAmount {
                amount: amount.to_string(),
                reason: e.to_string(),
            })
    }

    /// Format raw units as a decimal token amount.
    pub fn format_amount(&self, amount: U256) -> String {
        format_units(amount, self.decimals).unwrap_or_else(|_| amount.to_string())
    }

    /// Initial supply in raw units.
    pub fn initial_supply_units(&self) -> Result<U256, ConfigError> {
        self.parse_amount(&self.initial_supply)
    }
}
