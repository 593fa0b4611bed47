//! Fixed-supply fungible token ledger.
//!
//! This crate owns the token's accounting:
//! - balances keyed by account address, with the whole supply minted to the
//!   deployer at construction
//! - validated, all-or-nothing transfers returning the committed state delta
//! - `Transfer` notifications delivered to observers after every commit
//! - invariant checks (balances sum to the supply, no stored zero balances)

pub mod error;
pub mod observer;
pub mod state;

pub use binding::LabToken::Transfer;
pub use error::{InvariantError, TransferError};
pub use observer::{EventLog, TransferObserver};
pub use state::{BalanceChange, Ledger, StateSummary, TransferDelta};
