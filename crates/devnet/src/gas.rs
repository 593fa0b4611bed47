use config::GasSchedule;
use ledger::TransferDelta;

/// Number of topics on a `Transfer` log: signature, from, to.
const TRANSFER_LOG_TOPICS: usize = 3;
/// Data bytes on a `Transfer` log: one uint256.
const TRANSFER_LOG_DATA: usize = 32;
/// Refunds are capped at a fifth of the gas used.
const MAX_REFUND_QUOTIENT: u64 = 5;

/// Prices executed calls against a [`GasSchedule`].
#[derive(Debug, Clone, Copy)]
pub struct GasMeter {
    schedule: GasSchedule,
}

impl GasMeter {
    pub const fn new(schedule: GasSchedule) -> Self {
        Self { schedule }
    }

    /// Gas used by a committed transfer.
    pub fn transfer_cost(&self, input: &[u8], delta: &TransferDelta) -> u64 {
        let mut gas = self.schedule.intrinsic_cost(input);
        let mut refund: u64 = 0;

        for write in delta.slot_writes() {
            if write.before.is_zero() && !write.after.is_zero() {
                gas = gas.saturating_add(self.schedule.storage_set);
            } else {
                gas = gas.saturating_add(self.schedule.storage_update);
                if !write.before.is_zero() && write.after.is_zero() {
                    refund = refund.saturating_add(self.schedule.storage_clear_refund);
                }
            }
        }

        gas = gas.saturating_add(
            self.schedule
                .log_cost(TRANSFER_LOG_TOPICS, TRANSFER_LOG_DATA),
        );

        gas - refund.min(gas / MAX_REFUND_QUOTIENT)
    }

    /// Gas used by a call that reverted before touching state.
    pub fn revert_cost(&self, input: &[u8]) -> u64 {
        self.schedule.intrinsic_cost(input)
    }
}
