//! Transactions and receipts.

use alloy_primitives::{keccak256, Address, Bytes, Log, Signature, TxHash, B256};
use binding::token::{decode_revert_reason, decode_transfer_log};
use ledger::Transfer;
use tokio::sync::oneshot;

use crate::NodeError;

/// An unsigned call to a contract on the devnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    /// Contract being called
    pub to: Address,
    /// ABI-encoded calldata
    pub input: Bytes,
}

impl Transaction {
    /// Hash signed by the sender: keccak256(chain_id ‖ nonce ‖ to ‖ input).
    pub fn signing_hash(&self) -> B256 {
        let mut buf = Vec::with_capacity(8 + 8 + 20 + self.input.len());
        buf.extend_from_slice(&self.chain_id.to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(self.to.as_slice());
        buf.extend_from_slice(&self.input);
        keccak256(&buf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Transaction hash: keccak256(signing_hash ‖ signature).
    pub fn hash(&self) -> TxHash {
        let mut buf = self.tx.signing_hash().to_vec();
        buf.extend_from_slice(&self.signature.as_bytes());
        keccak256(&buf)
    }

    /// Recover the sender address from the signature.
    pub fn recover_sender(&self) -> Result<Address, NodeError> {
        self.signature
            .recover_address_from_prehash(&self.tx.signing_hash())
            .map_err(|e| NodeError::InvalidSignature(format!("{}", e)))
    }
}

/// Outcome of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: u64,
    /// Recovered sender
    pub from: Address,
    /// Contract called
    pub to: Address,
    /// True if the call succeeded
    pub status: bool,
    /// Execution cost
    pub gas_used: u64,
    /// Logs emitted, empty when the call reverted
    pub logs: Vec<Log>,
    /// `Error(string)` revert data, empty on success
    pub revert_data: Bytes,
}

impl Receipt {
    /// Revert reason of a failed call.
    pub fn revert_reason(&self) -> Option<String> {
        if self.status {
            return None;
        }
        decode_revert_reason(&self.revert_data)
    }

    /// All `Transfer` events carried by the receipt's logs.
    pub fn transfer_events(&self) -> Vec<Transfer> {
        self.logs.iter().filter_map(decode_transfer_log).collect()
    }
}

/// A transaction accepted by the node and waiting to be executed.
#[derive(Debug)]
pub struct PendingTransaction {
    hash: TxHash,
    receipt: oneshot::Receiver<Receipt>,
}

impl PendingTransaction {
    pub(crate) const fn new(hash: TxHash, receipt: oneshot::Receiver<Receipt>) -> Self {
        Self { hash, receipt }
    }

    pub const fn hash(&self) -> TxHash {
        self.hash
    }

    /// Wait for the transaction to be executed and return its receipt.
    pub async fn wait(self) -> Result<Receipt, NodeError> {
        self.receipt.await.map_err(|_| NodeError::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Account;
    use alloy_primitives::U256;
    use binding::token::{revert_data, transfer_log};

    fn transaction(nonce: u64) -> Transaction {
        Transaction {
            chain_id: 31337,
            nonce,
            to: Address::repeat_byte(0x42),
            input: Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb]),
        }
    }

    #[test]
    fn test_signing_hash_covers_every_field() {
        let base = transaction(0);
        let mut hashes = std::collections::HashSet::new();
        hashes.insert(base.signing_hash());

        hashes.insert(transaction(1).signing_hash());
        hashes.insert(
            Transaction {
                chain_id: 1,
                ..base.clone()
            }
            .signing_hash(),
        );
        hashes.insert(
            Transaction {
                to: Address::repeat_byte(0x43),
                ..base.clone()
            }
            .signing_hash(),
        );
        hashes.insert(
            Transaction {
                input: Bytes::new(),
                ..base
            }
            .signing_hash(),
        );

        assert_eq!(hashes.len(), 5, "Hash collision detected!");
    }

    #[test]
    fn test_tampered_transaction_recovers_other_sender() {
        let account = Account::random();
        let mut signed = account.sign_transaction(transaction(0)).unwrap();
        signed.tx.nonce = 99;

        let recovered = signed.recover_sender();
        assert!(!matches!(recovered, Ok(sender) if sender == account.address()));
    }

    #[test]
    fn test_receipt_accessors() {
        let event = Transfer {
            from: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            value: U256::from(3),
        };

        let success = Receipt {
            tx_hash: TxHash::ZERO,
            block_number: 1,
            from: event.from,
            to: Address::repeat_byte(0x42),
            status: true,
            gas_used: 50_000,
            logs: vec![transfer_log(Address::repeat_byte(0x42), &event)],
            revert_data: Bytes::new(),
        };
        assert_eq!(success.revert_reason(), None);
        assert_eq!(success.transfer_events(), vec![event]);

        let failure = Receipt {
            status: false,
            logs: vec![],
            revert_data: revert_data("AMOUNT_ZERO"),
            ..success
        };
        assert_eq!(failure.revert_reason().as_deref(), Some("AMOUNT_ZERO"));
        assert!(failure.transfer_events().is_empty());
    }
}
