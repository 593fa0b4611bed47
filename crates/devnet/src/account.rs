use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use alloy_primitives::Address;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::{
    transaction::{SignedTransaction, Transaction},
    NodeError,
};

/// A signer identity on the devnet.
///
/// Clones share the same nonce counter, so transactions built from any clone
/// never reuse a nonce.
#[derive(Debug, Clone)]
pub struct Account {
    signer: PrivateKeySigner,
    nonce: Arc<AtomicU64>,
}

impl Account {
    /// Generate a fresh account with a random private key.
    pub fn random() -> Self {
        Self::from_signer(PrivateKeySigner::random())
    }

    /// Load an account from a hex private key (with or without 0x prefix).
    pub fn from_private_key(private_key: &str) -> Result<Self, NodeError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| NodeError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self::from_signer(signer))
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Reserve the next nonce for this account.
    pub fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Sign a transaction with this account's key.
    pub fn sign_transaction(&self, tx: Transaction) -> Result<SignedTransaction, NodeError> {
        let signature = self
            .signer
            .sign_hash_sync(&tx.signing_hash())
            .map_err(|e| NodeError::Signing(format!("{}", e)))?;

        Ok(SignedTransaction { tx, signature })
    }
}
