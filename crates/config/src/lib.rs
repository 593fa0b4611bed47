//! Configuration types for the LabToken devnet.
//!
//! This crate provides:
//! - Token metadata and decimal amount conversion
//! - The gas schedule used to price transactions
//! - Devnet parameters and a builder for custom setups

pub mod devnet;
pub mod gas;
pub mod token;

pub use devnet::{DevnetConfig, DevnetConfigBuilder, DEVNET_CHAIN_ID};
pub use gas::GasSchedule;
pub use token::TokenConfig;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Amount could not be parsed with the token's decimals
    #[error("Invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    /// Token amounts are unsigned
    #[error("Negative amount {0:?}")]
    NegativeAmount(String),
}
