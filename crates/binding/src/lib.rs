//! Contract bindings for the LabToken ledger.
//!
//! The token ABI is the wire format of everything the ledger exposes:
//! - `transfer(address,uint256)` calldata submitted by callers
//! - `Transfer(address,address,uint256)` event logs emitted on success
//! - `Error(string)` revert data carried by failed receipts
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod token;

pub use token::LabToken;
