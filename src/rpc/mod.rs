//! Chain RPC access
//!
//! The coordinator only needs a handful of `eth_*` methods. They sit behind the
//! [`ChainRpc`] trait so the strategy and sealing code can run against an in-memory
//! chain in tests and against [`HttpChainRpc`] in production.

pub mod confirm;
pub mod errors;
pub mod http;
pub mod types;

pub use confirm::{wait_for_confirmations, ConfirmationError, ConfirmationPolicy};
pub use errors::RpcError;
pub use http::HttpChainRpc;
pub use types::{CallRequest, Log, TransactionReceipt};

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::chains::ChainSlug;

/// JSON-RPC surface used by the coordinator.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// `eth_blockNumber`
    async fn block_number(&self) -> Result<u64, RpcError>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending or unknown.
    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcError>;

    /// `eth_call` against the latest block
    async fn call(&self, request: CallRequest) -> Result<Bytes, RpcError>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, RpcError>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> Result<u128, RpcError>;

    /// `eth_getTransactionCount` at the pending block
    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError>;

    /// `eth_sendRawTransaction`
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError>;
}

/// Resolves the RPC client for a chain.
pub trait ProviderSource: Send + Sync {
    /// Client for `slug`.
    fn provider(&self, slug: ChainSlug) -> Result<Arc<dyn ChainRpc>, RpcError>;
}

/// Endpoint URLs keyed by chain slug.
#[derive(Debug, Clone, Default)]
pub struct RpcEndpoints {
    urls: HashMap<ChainSlug, String>,
}

impl RpcEndpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the endpoint for a chain.
    pub fn insert(&mut self, slug: ChainSlug, url: impl Into<String>) {
        self.urls.insert(slug, url.into());
    }

    /// Endpoint for a chain.
    pub fn url(&self, slug: ChainSlug) -> Option<&str> {
        self.urls.get(&slug).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl ProviderSource for RpcEndpoints {
    fn provider(&self, slug: ChainSlug) -> Result<Arc<dyn ChainRpc>, RpcError> {
        let url = self.url(slug).ok_or(RpcError::MissingEndpoint(slug))?;
        Ok(Arc::new(HttpChainRpc::new(url)?))
    }
}
