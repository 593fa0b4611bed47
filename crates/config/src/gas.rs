//! Gas schedule used by the devnet to price transactions.
//!
//! Costs follow the shape of the EVM schedule closely enough that a plain
//! token transfer lands in the same range a real chain reports. They are an
//! opaque measurement only; nothing is ever aborted for running out of gas.
//! Every sum saturates at `u64::MAX`, so any schedule is safe to price with.

use serde::{Deserialize, Serialize};

/// Per-operation gas costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Intrinsic cost of every transaction
    pub base: u64,
    /// Cost per zero calldata byte
    pub calldata_zero_byte: u64,
    /// Cost per non-zero calldata byte
    pub calldata_nonzero_byte: u64,
    /// Writing a non-zero value into an empty balance slot
    pub storage_set: u64,
    /// Rewriting an already non-zero balance slot
    pub storage_update: u64,
    /// Refund for clearing a balance slot back to zero
    pub storage_clear_refund: u64,
    /// Base cost of emitting a log
    pub log: u64,
    /// Cost per log topic
    pub log_topic: u64,
    /// Cost per byte of log data
    pub log_data_byte: u64,
}

impl GasSchedule {
    /// Mainnet-like schedule.
    pub const fn mainnet() -> Self {
        Self {
            base: 21_000,
            calldata_zero_byte: 4,
            calldata_nonzero_byte: 16,
            storage_set: 20_000,
            storage_update: 5_000,
            storage_clear_refund: 4_800,
            log: 375,
            log_topic: 375,
            log_data_byte: 8,
        }
    }

    /// Cost of carrying `input` as calldata.
    pub fn calldata_cost(&self, input: &[u8]) -> u64 {
        input
            .iter()
            .map(|byte| {
                if *byte == 0 {
                    self.calldata_zero_byte
                } else {
                    self.calldata_nonzero_byte
                }
            })
            .fold(0, u64::saturating_add)
    }

    /// Intrinsic cost of a transaction carrying `input`.
    pub fn intrinsic_cost(&self, input: &[u8]) -> u64 {
        self.base.saturating_add(self.calldata_cost(input))
    }

    /// Cost of emitting one log with `topics` topics and `data_len` bytes of data.
    pub const fn log_cost(&self, topics: usize, data_len: usize) -> u64 {
        self.log
            .saturating_add(self.log_topic.saturating_mul(topics as u64))
            .saturating_add(self.log_data_byte.saturating_mul(data_len as u64))
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self::mainnet()
    }
}
