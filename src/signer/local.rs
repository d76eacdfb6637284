use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxKind, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{sign_digest_with, ChainSigner, SignerError, SignerMode, TxRequest};
use crate::rpc::{CallRequest, ChainRpc};

/// Gas estimate headroom, in percent
const GAS_LIMIT_BUFFER_PERCENT: u64 = 20;

/// Signs and broadcasts transactions with a local key.
///
/// The nonce is cached after the first submission, and the cache lock is held across
/// each submission so transactions from one signer are strictly ordered.
pub struct LocalSigner {
    key: PrivateKeySigner,
    rpc: Arc<dyn ChainRpc>,
    chain_id: u64,
    next_nonce: Mutex<Option<u64>>,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.key.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl LocalSigner {
    /// Create a signer for the chain with native id `chain_id`.
    pub fn new(key: PrivateKeySigner, rpc: Arc<dyn ChainRpc>, chain_id: u64) -> Self {
        Self {
            key,
            rpc,
            chain_id,
            next_nonce: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChainSigner for LocalSigner {
    fn address(&self) -> Address {
        self.key.address()
    }

    fn mode(&self) -> SignerMode {
        SignerMode::Direct
    }

    async fn sign_digest(&self, digest: B256) -> Result<Bytes, SignerError> {
        sign_digest_with(&self.key, digest).await
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<B256, SignerError> {
        let mut next_nonce = self.next_nonce.lock().await;
        let from = self.key.address();

        let nonce = match *next_nonce {
            Some(nonce) => nonce,
            None => self.rpc.transaction_count(from).await?,
        };

        // Simulation surfaces reverts (and their custom error data) before anything is broadcast
        let estimate = self
            .rpc
            .estimate_gas(CallRequest::new(request.to, request.data.clone()).with_from(from))
            .await?;
        let gas_limit = estimate + estimate * GAS_LIMIT_BUFFER_PERCENT / 100;
        let gas_price = self.rpc.gas_price().await?;

        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(request.to),
            value: request.value,
            input: request.data,
        };

        let signature = self
            .key
            .sign_hash(&tx.signature_hash())
            .await
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
        let envelope = TxEnvelope::from(tx.into_signed(signature));
        let raw = Bytes::from(envelope.encoded_2718());

        let tx_hash = self.rpc.send_raw_transaction(raw).await?;
        *next_nonce = Some(nonce + 1);

        debug!(target: "signer", %tx_hash, nonce, gas_limit, "Broadcast transaction");
        Ok(tx_hash)
    }
}
