//! LabToken contract bindings.

use alloy_primitives::{Address, Bytes, Log, U256};
use alloy_sol_types::{sol, Revert, SolCall, SolError, SolEvent};

sol! {
    /// Fixed-supply ERC20 token interface (no allowances, no mint/burn).
    #[sol(all_derives)]
    interface LabToken {
        /// Emitted when tokens are transferred
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Transfer tokens to recipient
        function transfer(address to, uint256 amount) external returns (bool);

        /// Get token name
        function name() external view returns (string memory);

        /// Get token symbol
        function symbol() external view returns (string memory);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Get total supply
        function totalSupply() external view returns (uint256);
    }
}

/// ABI-encoded calldata for `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    LabToken::transferCall { to, amount }.abi_encode().into()
}

/// Decode `transfer(to, amount)` calldata. Returns `None` for any other selector.
pub fn decode_transfer(input: &[u8]) -> Option<LabToken::transferCall> {
    LabToken::transferCall::abi_decode(input).ok()
}

/// EVM log of a `Transfer` event emitted by the token at `token`.
pub fn transfer_log(token: Address, event: &LabToken::Transfer) -> Log {
    Log {
        address: token,
        data: event.encode_log_data(),
    }
}

/// Decode a `Transfer` event from a log. Returns `None` for any other log.
pub fn decode_transfer_log(log: &Log) -> Option<LabToken::Transfer> {
    if log.data.topics().first() != Some(&LabToken::Transfer::SIGNATURE_HASH) {
        return None;
    }
    LabToken::Transfer::decode_log_data(&log.data).ok()
}

/// Encode a revert reason as standard `Error(string)` revert data.
pub fn revert_data(reason: &str) -> Bytes {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
    .into()
}

/// Decode `Error(string)` revert data back into its reason.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data).ok().map(|revert| revert.reason)
}
