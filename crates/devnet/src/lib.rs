//! In-process devnet for the LabToken ledger.
//!
//! This crate plays the part of the chain the token is deployed on:
//! - generates signer accounts and deploys the ledger from the first one
//! - runs a single-writer node that executes signed transactions in order
//! - returns receipts with status, `Transfer` logs, revert reason and gas used

pub mod account;
pub mod gas;
pub mod node;
pub mod token;
pub mod transaction;

pub use account::Account;
pub use gas::GasMeter;
pub use node::{Node, NodeHandle};
pub use token::TokenClient;
pub use transaction::{PendingTransaction, Receipt, SignedTransaction, Transaction};

use alloy_primitives::{keccak256, Address};
use config::{ConfigError, DevnetConfig};
use ledger::{InvariantError, Ledger};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum NodeError {
    /// The node task has stopped
    #[error("Node has shut down")]
    Shutdown,

    /// Sender could not be recovered from the signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Signing a transaction failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Transaction signed for another chain
    #[error("Transaction signed for chain {got}, node runs chain {expected}")]
    WrongChain { expected: u64, got: u64 },

    /// Call would revert (estimation only; executed reverts are in receipts)
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// A devnet needs a deployer
    #[error("Devnet needs at least one account")]
    NoAccounts,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Ledger invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

/// A running devnet with the token deployed.
#[derive(Debug)]
pub struct Devnet {
    config: DevnetConfig,
    accounts: Vec<Account>,
    node: NodeHandle,
}

impl Devnet {
    /// Generate `config.accounts` random accounts and deploy the token from
    /// the first one. Must be called from within a tokio runtime.
    pub fn start(config: DevnetConfig) -> Result<Self, NodeError> {
        let accounts = (0..config.accounts).map(|_| Account::random()).collect();
        Self::start_with_accounts(config, accounts)
    }

    /// Deploy the token from `accounts[0]`, crediting it the initial supply.
    pub fn start_with_accounts(
        config: DevnetConfig,
        accounts: Vec<Account>,
    ) -> Result<Self, NodeError> {
        let deployer = accounts.first().ok_or(NodeError::NoAccounts)?;
        let supply = config.token.initial_supply_units()?;

        let ledger = Ledger::new(supply, deployer.address());
        let token = contract_address(deployer.address(), deployer.next_nonce());

        info!(
            name = %config.token.name,
            symbol = %config.token.symbol,
            %token,
            deployer = %deployer.address(),
            supply = %config.token.format_amount(supply),
            "Token deployed"
        );

        let node = Node::spawn(ledger, token, config.chain_id, config.gas);

        Ok(Self {
            config,
            accounts,
            node,
        })
    }

    pub const fn config(&self) -> &DevnetConfig {
        &self.config
    }

    /// All generated accounts; index 0 is the deployer.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn deployer(&self) -> &Account {
        &self.accounts[0]
    }

    pub const fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Token handle calling from `caller`.
    pub fn token(&self, caller: &Account) -> TokenClient {
        TokenClient::new(self.node.clone(), caller.clone(), self.config.token.clone())
    }
}

/// Address of a contract created by `deployer` with `nonce`.
fn contract_address(deployer: Address, nonce: u64) -> Address {
    let mut buf = [0u8; 28];
    buf[..20].copy_from_slice(deployer.as_slice());
    buf[20..].copy_from_slice(&nonce.to_be_bytes());
    Address::from_slice(&keccak256(buf)[12..])
}
