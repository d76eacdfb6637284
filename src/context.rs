//! Per-chain execution context shared by the strategy and sealing paths.

use alloy_primitives::{Address, Bytes, B256};
use std::sync::Arc;
use tracing::info;

use crate::abi::decode_address;
use crate::chains::ChainMeta;
use crate::rpc::{
    wait_for_confirmations, CallRequest, ChainRpc, ConfirmationError, ConfirmationPolicy, RpcError,
    TransactionReceipt,
};
use crate::signer::{ChainSigner, SignerError, TxRequest};
use thiserror::Error;

/// Failure of a read or a confirmed write on one chain
#[derive(Debug, Error)]
pub enum ChainCallError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("Transaction {tx} not confirmed: {reason}")]
    NotConfirmed {
        tx: B256,
        #[source]
        reason: ConfirmationError,
    },

    /// Return data did not decode as the expected type
    #[error("Unexpected return data from {to}: 0x{data}")]
    BadReturnData { to: Address, data: String },
}

/// Everything needed to read from and write to one chain.
#[derive(Clone)]
pub struct ChainContext {
    pub meta: &'static ChainMeta,
    pub rpc: Arc<dyn ChainRpc>,
    pub signer: Arc<dyn ChainSigner>,
    pub policy: ConfirmationPolicy,
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("chain", &self.meta.slug)
            .field("signer", &self.signer.address())
            .field("mode", &self.signer.mode())
            .finish()
    }
}

impl ChainContext {
    pub fn new(
        meta: &'static ChainMeta,
        rpc: Arc<dyn ChainRpc>,
        signer: Arc<dyn ChainSigner>,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            meta,
            rpc,
            signer,
            policy,
        }
    }

    /// `eth_call` returning a single address word.
    pub async fn read_address(&self, to: Address, data: Bytes) -> Result<Address, ChainCallError> {
        let output = self.rpc.call(CallRequest::new(to, data)).await?;
        decode_address(&output).ok_or_else(|| ChainCallError::BadReturnData {
            to,
            data: hex::encode(&output),
        })
    }

    /// Send a call as a transaction and wait for the chain's confirmation depth.
    pub async fn transact(
        &self,
        to: Address,
        data: Bytes,
    ) -> Result<TransactionReceipt, ChainCallError> {
        let tx = self.signer.send_transaction(TxRequest::call(to, data)).await?;
        info!(target: "chain", chain = %self.meta.slug, tx_hash = %tx, %to, "Sent transaction");
        self.confirm(tx).await
    }

    /// Wait for the chain's confirmation depth on an already-sent transaction.
    pub async fn confirm(&self, tx: B256) -> Result<TransactionReceipt, ChainCallError> {
        wait_for_confirmations(self.rpc.as_ref(), tx, self.meta.confirmations, self.policy)
            .await
            .map_err(|reason| ChainCallError::NotConfirmed { tx, reason })
    }
}
