use alloy_primitives::{Address, U256};
use binding::token::transfer_calldata;
use config::TokenConfig;

use crate::{
    node::NodeHandle,
    transaction::{PendingTransaction, Transaction},
    Account, NodeError,
};

/// Token contract bound to a calling account.
///
/// Mirrors how a contract handle is used from a script: reads go straight to
/// the node, `transfer` signs and submits a transaction on behalf of the
/// caller and hands back a [`PendingTransaction`] to wait on.
#[derive(Debug, Clone)]
pub struct TokenClient {
    node: NodeHandle,
    caller: Account,
    metadata: TokenConfig,
}

impl TokenClient {
    pub const fn new(node: NodeHandle, caller: Account, metadata: TokenConfig) -> Self {
        Self {
            node,
            caller,
            metadata,
        }
    }

    /// Address of the token contract.
    pub const fn address(&self) -> Address {
        self.node.token()
    }

    /// Account that signs this client's transactions.
    pub fn caller(&self) -> Address {
        self.caller.address()
    }

    /// The same token, called from a different account.
    pub fn connect(&self, caller: &Account) -> Self {
        Self {
            node: self.node.clone(),
            caller: caller.clone(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub const fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// Convert a decimal token amount into raw units.
    pub fn parse_units(&self, amount: &str) -> Result<U256, NodeError> {
        Ok(self.metadata.parse_amount(amount)?)
    }

    pub fn format_units(&self, amount: U256) -> String {
        self.metadata.format_amount(amount)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, NodeError> {
        self.node.balance_of(account).await
    }

    pub async fn total_supply(&self) -> Result<U256, NodeError> {
        self.node.total_supply().await
    }

    /// Submit `transfer(to, amount)` from the caller.
    pub async fn transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> Result<PendingTransaction, NodeError> {
        let tx = Transaction {
            chain_id: self.node.chain_id(),
            nonce: self.caller.next_nonce(),
            to: self.node.token(),
            input: transfer_calldata(to, amount),
        };

        let signed = self.caller.sign_transaction(tx)?;
        self.node.send_transaction(signed).await
    }

    /// Estimate the gas of `transfer(to, amount)` from the caller.
    ///
    /// Fails with [`NodeError::Reverted`] if the transfer would be rejected.
    pub async fn estimate_transfer(&self, to: Address, amount: U256) -> Result<u64, NodeError> {
        self.node
            .estimate_gas(
                self.caller.address(),
                self.node.token(),
                transfer_calldata(to, amount),
            )
            .await
    }
}
