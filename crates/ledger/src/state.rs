//! Balance state and the transfer state transition.

use std::{
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::{
    error::{InvariantError, TransferError},
    observer::TransferObserver,
    Transfer,
};

type Result<T> = std::result::Result<T, TransferError>;

/// Balance of one account before and after a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub account: Address,
    pub before: U256,
    pub after: U256,
}

/// State delta of a validated transfer.
///
/// Produced by [`Ledger::prepare_transfer`] without touching state, and
/// returned by [`Ledger::transfer`] once committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDelta {
    /// The notification emitted for this transfer
    pub event: Transfer,
    /// Sender's balance
    pub debit: BalanceChange,
    /// Recipient's balance
    pub credit: BalanceChange,
}

impl TransferDelta {
    pub fn is_self_transfer(&self) -> bool {
        self.debit.account == self.credit.account
    }

    /// Balance slots written by this transfer, one entry per distinct account.
    ///
    /// A self-transfer writes the sender's slot once, with the value unchanged.
    pub fn slot_writes(&self) -> Vec<BalanceChange> {
        if self.is_self_transfer() {
            vec![BalanceChange {
                account: self.debit.account,
                before: self.debit.before,
                after: self.credit.after,
            }]
        } else {
            vec![self.debit, self.credit]
        }
    }
}

/// Summary returned by a successful invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSummary {
    /// Number of accounts holding a non-zero balance
    pub holders: usize,
    /// Sum of all balances, equal to the total supply
    pub balance_sum: U256,
}

/// Fixed-supply fungible token ledger.
///
/// The ledger is a single-writer value: transfers take `&mut self` and run to
/// completion (validate, commit, notify) before returning. Zero balances are
/// never stored, so every entry in the balance map is a real holder.
pub struct Ledger {
    total_supply: U256,
    balances: HashMap<Address, U256>,
    observers: Vec<Box<dyn TransferObserver>>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("total_supply", &self.total_supply)
            .field("balances", &self.balances)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Ledger {
    /// Create a ledger with the whole `initial_supply` credited to `owner`.
    pub fn new(initial_supply: U256, owner: Address) -> Self {
        let mut balances = HashMap::new();
        if !initial_supply.is_zero() {
            balances.insert(owner, initial_supply);
        }

        info!(%owner, supply = %initial_supply, "Ledger created");

        Self {
            total_supply: initial_supply,
            balances,
            observers: Vec::new(),
        }
    }

    /// Register an observer for transfer notifications.
    ///
    /// Observers are called in registration order.
    pub fn subscribe(&mut self, observer: impl TransferObserver + 'static) {
        self.subscribe_boxed(Box::new(observer));
    }

    pub fn subscribe_boxed(&mut self, observer: Box<dyn TransferObserver>) {
        self.observers.push(observer);
    }

    /// Current balance of `account`; zero for accounts never credited.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or(U256::ZERO)
    }

    pub const fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// All accounts with a non-zero balance, in no particular order.
    pub fn holders(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.balances.iter().map(|(account, balance)| (*account, *balance))
    }

    /// Validate a transfer and compute its delta without mutating state.
    ///
    /// Checks run in a fixed order: zero amount, zero recipient, then the
    /// caller's balance.
    pub fn prepare_transfer(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransferDelta> {
        if amount.is_zero() {
            return Err(TransferError::AmountZero);
        }

        if to == Address::ZERO {
            return Err(TransferError::ZeroAddress);
        }

        let balance = self.balance_of(caller);
        if balance < amount {
            return Err(TransferError::InsufficientBalance {
                account: caller,
                balance,
                needed: amount,
            });
        }

        let debit = BalanceChange {
            account: caller,
            before: balance,
            after: balance - amount,
        };

        let credit = if to == caller {
            BalanceChange {
                account: to,
                before: debit.after,
                after: balance,
            }
        } else {
            // cannot overflow: both balances are bounded by the total supply
            let before = self.balance_of(to);
            BalanceChange {
                account: to,
                before,
                after: before + amount,
            }
        };

        Ok(TransferDelta {
            event: Transfer {
                from: caller,
                to,
                value: amount,
            },
            debit,
            credit,
        })
    }

    /// Move `amount` from `caller` to `to`.
    ///
    /// On success both balances are updated in one step and every observer is
    /// notified with `Transfer(caller, to, amount)`. On failure nothing changes
    /// and no observer is called. A panicking observer is logged and skipped;
    /// the transfer stays committed.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransferDelta> {
        let delta = match self.prepare_transfer(caller, to, amount) {
            Ok(delta) => delta,
            Err(e) => {
                debug!(from = %caller, %to, %amount, reason = e.reason(), "Transfer rejected");
                return Err(e);
            }
        };

        for change in delta.slot_writes() {
            self.write_balance(change.account, change.after);
        }

        debug!(
            from = %caller,
            %to,
            %amount,
            from_balance = %delta.debit.after,
            to_balance = %delta.credit.after,
            "Transfer committed"
        );

        for (index, observer) in self.observers.iter_mut().enumerate() {
            let notified =
                panic::catch_unwind(AssertUnwindSafe(|| observer.on_transfer(&delta.event)));
            if notified.is_err() {
                warn!(
                    observer = index,
                    from = %caller,
                    %to,
                    %amount,
                    "Transfer observer panicked"
                );
            }
        }

        Ok(delta)
    }

    /// Verify the supply and storage invariants.
    pub fn check_invariants(&self) -> std::result::Result<StateSummary, InvariantError> {
        let mut balance_sum = U256::ZERO;

        for (account, balance) in &self.balances {
            // zero balances should not be stored in the map
            if balance.is_zero() {
                return Err(InvariantError::ExplicitZeroBalance(*account));
            }

            balance_sum = balance_sum
                .checked_add(*balance)
                .ok_or(InvariantError::BalanceOverflow { account: *account })?;
        }

        // all balances must add up to total supply
        if balance_sum != self.total_supply {
            return Err(InvariantError::BalanceSupplyMismatch {
                supply: self.total_supply,
                balance_sum,
            });
        }

        Ok(StateSummary {
            holders: self.balances.len(),
            balance_sum,
        })
    }

    fn write_balance(&mut self, account: Address, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }
}
