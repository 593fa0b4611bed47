use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Reasons a transfer is rejected. A rejected transfer never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("transfer amount must be non-zero")]
    AmountZero,
    #[error("cannot transfer to the zero address")]
    ZeroAddress,
    #[error("{account} has balance {balance} but attempted to transfer {needed}")]
    InsufficientBalance {
        account: Address,
        balance: U256,
        needed: U256,
    },
}

impl TransferError {
    /// Stable revert reason, as carried in `Error(string)` revert data.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::AmountZero => "AMOUNT_ZERO",
            Self::ZeroAddress => "ZERO_ADDRESS",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        }
    }
}

/// Violations of the ledger's state invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("stored a zero balance which should have been removed for {0}")]
    ExplicitZeroBalance(Address),
    #[error("the total supply {supply} does not match the sum of all balances {balance_sum}")]
    BalanceSupplyMismatch { supply: U256, balance_sum: U256 },
    #[error("sum of balances overflowed while adding {account}'s balance")]
    BalanceOverflow { account: Address },
}
