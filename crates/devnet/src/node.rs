//! Single-writer execution node.
//!
//! The node owns the ledger inside one task. Every request (transactions,
//! reads, estimates) goes through one channel and is handled to completion
//! in the order it was accepted, so transactions from concurrent callers are
//! totally ordered and reads never observe a half-applied transfer.

use alloy_primitives::{Address, Bytes, Log, TxHash, U256};
use binding::token::{decode_revert_reason, decode_transfer, revert_data, transfer_log};
use config::GasSchedule;
use ledger::{InvariantError, Ledger, StateSummary, TransferObserver};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    gas::GasMeter,
    transaction::{PendingTransaction, Receipt, SignedTransaction},
    NodeError,
};

/// Revert reason for calldata that is not a token call.
pub const UNKNOWN_SELECTOR: &str = "UNKNOWN_SELECTOR";
/// Revert reason for a call to an address without a contract.
pub const NO_CONTRACT: &str = "NO_CONTRACT";

/// Requests queued before senders start waiting.
const REQUEST_BUFFER: usize = 256;

enum Request {
    Send {
        from: Address,
        tx: Box<SignedTransaction>,
        hash: TxHash,
        reply: oneshot::Sender<Receipt>,
    },
    Estimate {
        from: Address,
        to: Address,
        input: Bytes,
        reply: oneshot::Sender<Result<u64, NodeError>>,
    },
    BalanceOf {
        account: Address,
        reply: oneshot::Sender<U256>,
    },
    TotalSupply {
        reply: oneshot::Sender<U256>,
    },
    Holders {
        reply: oneshot::Sender<Vec<(Address, U256)>>,
    },
    BlockNumber {
        reply: oneshot::Sender<u64>,
    },
    CheckInvariants {
        reply: oneshot::Sender<Result<StateSummary, InvariantError>>,
    },
    Subscribe {
        observer: Box<dyn TransferObserver>,
    },
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Send { .. } => "Send",
            Self::Estimate { .. } => "Estimate",
            Self::BalanceOf { .. } => "BalanceOf",
            Self::TotalSupply { .. } => "TotalSupply",
            Self::Holders { .. } => "Holders",
            Self::BlockNumber { .. } => "BlockNumber",
            Self::CheckInvariants { .. } => "CheckInvariants",
            Self::Subscribe { .. } => "Subscribe",
        };
        f.write_str(name)
    }
}

/// Result of running a call against the ledger.
struct Execution {
    status: bool,
    gas_used: u64,
    logs: Vec<Log>,
    revert_data: Bytes,
}

impl Execution {
    fn revert(reason: &str, gas_used: u64) -> Self {
        Self {
            status: false,
            gas_used,
            logs: Vec::new(),
            revert_data: revert_data(reason),
        }
    }
}

pub struct Node {
    ledger: Ledger,
    token: Address,
    meter: GasMeter,
    block_number: u64,
    requests: mpsc::Receiver<Request>,
}

impl Node {
    /// Start a node serving `ledger` at `token` and return a handle to it.
    ///
    /// Must be called from within a tokio runtime. The node stops once every
    /// handle has been dropped.
    pub fn spawn(ledger: Ledger, token: Address, chain_id: u64, gas: GasSchedule) -> NodeHandle {
        let (sender, requests) = mpsc::channel(REQUEST_BUFFER);

        let node = Self {
            ledger,
            token,
            meter: GasMeter::new(gas),
            block_number: 0,
            requests,
        };

        info!(%token, chain_id, "Starting node");
        tokio::spawn(node.run());

        NodeHandle {
            requests: sender,
            token,
            chain_id,
        }
    }

    async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.handle(request);
        }

        debug!(block = self.block_number, "All handles dropped, node stopped");
    }

    fn handle(&mut self, request: Request) {
        // a dropped reply receiver only means the caller stopped waiting
        match request {
            Request::Send {
                from,
                tx,
                hash,
                reply,
            } => {
                let receipt = self.execute(from, &tx, hash);
                let _ = reply.send(receipt);
            }
            Request::Estimate {
                from,
                to,
                input,
                reply,
            } => {
                let _ = reply.send(self.estimate(from, to, &input));
            }
            Request::BalanceOf { account, reply } => {
                let _ = reply.send(self.ledger.balance_of(account));
            }
            Request::TotalSupply { reply } => {
                let _ = reply.send(self.ledger.total_supply());
            }
            Request::Holders { reply } => {
                let _ = reply.send(self.ledger.holders().collect());
            }
            Request::BlockNumber { reply } => {
                let _ = reply.send(self.block_number);
            }
            Request::CheckInvariants { reply } => {
                let _ = reply.send(self.ledger.check_invariants());
            }
            Request::Subscribe { observer } => {
                self.ledger.subscribe_boxed(observer);
            }
        }
    }

    /// Execute a transaction in its own block.
    fn execute(&mut self, from: Address, tx: &SignedTransaction, hash: TxHash) -> Receipt {
        self.block_number += 1;

        let execution = self.call(from, tx.tx.to, &tx.tx.input);

        if execution.status {
            debug!(
                %hash,
                %from,
                block = self.block_number,
                gas_used = execution.gas_used,
                "Transaction succeeded"
            );
        } else {
            warn!(
                %hash,
                %from,
                block = self.block_number,
                reason = ?decode_revert_reason(&execution.revert_data),
                "Transaction reverted"
            );
        }

        Receipt {
            tx_hash: hash,
            block_number: self.block_number,
            from,
            to: tx.tx.to,
            status: execution.status,
            gas_used: execution.gas_used,
            logs: execution.logs,
            revert_data: execution.revert_data,
        }
    }

    fn call(&mut self, from: Address, to: Address, input: &[u8]) -> Execution {
        if to != self.token {
            return Execution::revert(NO_CONTRACT, self.meter.revert_cost(input));
        }

        let Some(call) = decode_transfer(input) else {
            return Execution::revert(UNKNOWN_SELECTOR, self.meter.revert_cost(input));
        };

        match self.ledger.transfer(from, call.to, call.amount) {
            Ok(delta) => Execution {
                status: true,
                gas_used: self.meter.transfer_cost(input, &delta),
                logs: vec![transfer_log(self.token, &delta.event)],
                revert_data: Bytes::new(),
            },
            Err(e) => Execution::revert(e.reason(), self.meter.revert_cost(input)),
        }
    }

    /// Gas a call would use, without committing anything.
    fn estimate(&self, from: Address, to: Address, input: &[u8]) -> Result<u64, NodeError> {
        if to != self.token {
            return Err(NodeError::Reverted(NO_CONTRACT.to_string()));
        }

        let call = decode_transfer(input)
            .ok_or_else(|| NodeError::Reverted(UNKNOWN_SELECTOR.to_string()))?;

        let delta = self
            .ledger
            .prepare_transfer(from, call.to, call.amount)
            .map_err(|e| NodeError::Reverted(e.reason().to_string()))?;

        Ok(self.meter.transfer_cost(input, &delta))
    }
}

/// Cloneable handle for submitting requests to a running [`Node`].
#[derive(Debug, Clone)]
pub struct NodeHandle {
    requests: mpsc::Sender<Request>,
    token: Address,
    chain_id: u64,
}

impl NodeHandle {
    /// Address of the token contract served by the node.
    pub const fn token(&self) -> Address {
        self.token
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Submit a signed transaction.
    ///
    /// Returns once the node has accepted the transaction into its queue. The
    /// signature is checked here; execution failures are reported in the
    /// receipt instead.
    pub async fn send_transaction(
        &self,
        tx: SignedTransaction,
    ) -> Result<PendingTransaction, NodeError> {
        if tx.tx.chain_id != self.chain_id {
            return Err(NodeError::WrongChain {
                expected: self.chain_id,
                got: tx.tx.chain_id,
            });
        }

        let from = tx.recover_sender()?;
        let hash = tx.hash();
        let (reply, receipt) = oneshot::channel();

        self.requests
            .send(Request::Send {
                from,
                tx: Box::new(tx),
                hash,
                reply,
            })
            .await
            .map_err(|_| NodeError::Shutdown)?;

        debug!(%hash, %from, "Transaction accepted");

        Ok(PendingTransaction::new(hash, receipt))
    }

    /// Estimate the gas of a call from `from`. Fails if the call would revert.
    pub async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<u64, NodeError> {
        self.request(|reply| Request::Estimate {
            from,
            to,
            input,
            reply,
        })
        .await?
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, NodeError> {
        self.request(|reply| Request::BalanceOf { account, reply })
            .await
    }

    pub async fn total_supply(&self) -> Result<U256, NodeError> {
        self.request(|reply| Request::TotalSupply { reply }).await
    }

    /// All accounts holding a non-zero balance.
    pub async fn holders(&self) -> Result<Vec<(Address, U256)>, NodeError> {
        self.request(|reply| Request::Holders { reply }).await
    }

    /// Number of the latest block; one block per executed transaction.
    pub async fn block_number(&self) -> Result<u64, NodeError> {
        self.request(|reply| Request::BlockNumber { reply }).await
    }

    pub async fn check_invariants(&self) -> Result<StateSummary, NodeError> {
        Ok(self
            .request(|reply| Request::CheckInvariants { reply })
            .await??)
    }

    /// Register an observer for transfers executed after this call.
    pub async fn subscribe(
        &self,
        observer: impl TransferObserver + 'static,
    ) -> Result<(), NodeError> {
        self.requests
            .send(Request::Subscribe {
                observer: Box::new(observer),
            })
            .await
            .map_err(|_| NodeError::Shutdown)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, NodeError> {
        let (reply, response) = oneshot::channel();

        self.requests
            .send(build(reply))
            .await
            .map_err(|_| NodeError::Shutdown)?;

        response.await.map_err(|_| NodeError::Shutdown)
    }
}
