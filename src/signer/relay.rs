use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HeaderMap, HeaderValue, HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{sign_digest_with, ChainSigner, SignerError, SignerMode, TxRequest};
use crate::abi::{encode_address, encode_params, encode_u256, encode_u64, Token};
use crate::rpc::http::map_client_error;
use crate::rpc::RpcError;

/// Header carrying the relay API key
const API_KEY_HEADER: &str = "x-api-key";

/// JSON-RPC method accepting Safe transactions
const SUBMIT_METHOD: &str = "relay_submitTransaction";

/// A transaction to be executed by a Safe through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// Native chain id
    pub chain_id: u64,
    /// Safe that owns the target contracts
    pub safe: Address,
    /// Optional wrapper contract the relay routes Safe transactions through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_wrapper: Option<Address>,
    /// Proposing owner
    pub sender: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    /// Proposer's personal-message signature over [`RelayRequest::digest`]
    pub signature: Bytes,
}

impl RelayRequest {
    /// Digest the proposer signs:
    /// `keccak256(abi.encode(chainId, safe, to, value, keccak256(data)))`.
    pub fn digest(chain_id: u64, safe: Address, tx: &TxRequest) -> B256 {
        keccak256(encode_params(&[
            Token::Word(encode_u64(chain_id)),
            Token::Word(encode_address(safe)),
            Token::Word(encode_address(tx.to)),
            Token::Word(encode_u256(tx.value)),
            Token::Word(keccak256(&tx.data)),
        ]))
    }
}

/// Multisig relay service.
#[async_trait]
pub trait RelayService: Send + Sync {
    /// Submit a Safe transaction, returning the hash of the executing transaction.
    async fn submit(&self, request: RelayRequest) -> Result<B256, SignerError>;
}

/// [`RelayService`] over HTTP JSON-RPC with an API key header.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: HttpClient,
}

impl HttpRelay {
    /// Build a relay client.
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self, SignerError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| {
                SignerError::Relay(RpcError::Transport(format!("invalid API key header: {e}")))
            })?;
            headers.insert(API_KEY_HEADER, value);
        }
        let client = HttpClientBuilder::default()
            .set_headers(headers)
            .build(url)
            .map_err(|e| SignerError::Relay(RpcError::Transport(format!("{url}: {e}"))))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RelayService for HttpRelay {
    async fn submit(&self, request: RelayRequest) -> Result<B256, SignerError> {
        self.client
            .request(SUBMIT_METHOD, rpc_params![request])
            .await
            .map_err(|e| SignerError::Relay(map_client_error(e)))
    }
}

/// Submits transactions through a multisig relay on behalf of a Safe.
pub struct RelayedSigner {
    key: PrivateKeySigner,
    relay: Arc<dyn RelayService>,
    chain_id: u64,
    safe: Address,
    safe_wrapper: Option<Address>,
}

impl std::fmt::Debug for RelayedSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayedSigner")
            .field("address", &self.key.address())
            .field("chain_id", &self.chain_id)
            .field("safe", &self.safe)
            .finish()
    }
}

impl RelayedSigner {
    pub fn new(
        key: PrivateKeySigner,
        relay: Arc<dyn RelayService>,
        chain_id: u64,
        safe: Address,
        safe_wrapper: Option<Address>,
    ) -> Self {
        Self {
            key,
            relay,
            chain_id,
            safe,
            safe_wrapper,
        }
    }

    /// Safe the transactions are executed by.
    pub fn safe(&self) -> Address {
        self.safe
    }
}

#[async_trait]
impl ChainSigner for RelayedSigner {
    fn address(&self) -> Address {
        self.key.address()
    }

    fn mode(&self) -> SignerMode {
        SignerMode::Relayed
    }

    async fn sign_digest(&self, digest: B256) -> Result<Bytes, SignerError> {
        sign_digest_with(&self.key, digest).await
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<B256, SignerError> {
        let digest = RelayRequest::digest(self.chain_id, self.safe, &tx);
        let signature = sign_digest_with(&self.key, digest).await?;
        let request = RelayRequest {
            chain_id: self.chain_id,
            safe: self.safe,
            safe_wrapper: self.safe_wrapper,
            sender: self.key.address(),
            to: tx.to,
            data: tx.data,
            value: tx.value,
            signature,
        };
        let tx_hash = self.relay.submit(request).await?;
        debug!(target: "signer", %tx_hash, safe = %self.safe, "Relayed transaction");
        Ok(tx_hash)
    }
}
