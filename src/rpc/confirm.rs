use alloy_primitives::B256;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use super::{ChainRpc, RpcError, TransactionReceipt};

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Upper bound for one confirmation wait
    pub timeout: Duration,
    /// Delay between receipt/head polls
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Why a transaction did not reach the required depth
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    /// Mined but reverted
    #[error("Transaction {0} reverted")]
    Reverted(B256),

    /// Not mined, or not deep enough, before the timeout
    #[error(
        "Transaction {tx} not confirmed after {waited:?} ({confirmations}/{required} confirmations)"
    )]
    Timeout {
        /// Transaction hash
        tx: B256,
        /// Time spent waiting
        waited: Duration,
        /// Confirmations observed at the deadline
        confirmations: u64,
        /// Required depth
        required: u64,
    },

    /// RPC failure while polling
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Poll until `tx_hash` is mined with `required` confirmations.
///
/// A required depth of 0 accepts the receipt as soon as it is mined.
pub async fn wait_for_confirmations(
    rpc: &dyn ChainRpc,
    tx_hash: B256,
    required: u64,
    policy: ConfirmationPolicy,
) -> Result<TransactionReceipt, ConfirmationError> {
    let started = Instant::now();
    let mut seen = 0u64;

    let poll = async {
        loop {
            if let Some(receipt) = rpc.transaction_receipt(tx_hash).await? {
                if !receipt.succeeded() {
                    return Err(ConfirmationError::Reverted(tx_hash));
                }
                let head = rpc.block_number().await?;
                seen = receipt.confirmations_at(head);
                if seen >= required.max(1) {
                    return Ok(receipt);
                }
                debug!(target: "confirm", %tx_hash, seen, required, "Waiting for confirmations");
            }
            sleep(policy.poll_interval).await;
        }
    };

    let outcome = timeout(policy.timeout, poll).await;
    match outcome {
        Ok(result) => result,
        Err(_) => Err(ConfirmationError::Timeout {
            tx: tx_hash,
            waited: started.elapsed(),
            confirmations: seen,
            required,
        }),
    }
}
