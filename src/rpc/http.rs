use alloy_primitives::{Address, Bytes, B256, U128, U64};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;

use super::{CallRequest, ChainRpc, RpcError, TransactionReceipt};

/// JSON-RPC error code nodes use for `execution reverted`
const REVERT_ERROR_CODE: i32 = 3;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`ChainRpc`] over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct HttpChainRpc {
    client: HttpClient,
    url: String,
}

impl HttpChainRpc {
    /// Build a client for `url`.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)
            .map_err(|e| RpcError::Transport(format!("{url}: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Map a jsonrpsee client error, extracting revert data when present.
pub(crate) fn map_client_error(err: ClientError) -> RpcError {
    match err {
        ClientError::Call(obj) => {
            let message = obj.message().to_string();
            let data = obj
                .data()
                .and_then(|raw| serde_json::from_str::<Bytes>(raw.get()).ok());
            let looks_like_revert =
                obj.code() == REVERT_ERROR_CODE || message.to_lowercase().contains("revert");
            match data {
                Some(data) if looks_like_revert => RpcError::Reverted { message, data },
                None if looks_like_revert => RpcError::Reverted {
                    message,
                    data: Bytes::new(),
                },
                _ => RpcError::Call {
                    code: obj.code(),
                    message,
                },
            }
        }
        ClientError::ParseError(e) => RpcError::InvalidResponse(e.to_string()),
        other => RpcError::Transport(other.to_string()),
    }
}

#[async_trait]
impl ChainRpc for HttpChainRpc {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U64 = self
            .client
            .request("eth_chainId", rpc_params![])
            .await
            .map_err(map_client_error)?;
        Ok(id.to::<u64>())
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let number: U64 = self
            .client
            .request("eth_blockNumber", rpc_params![])
            .await
            .map_err(map_client_error)?;
        Ok(number.to::<u64>())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        self.client
            .request("eth_getTransactionReceipt", rpc_params![tx_hash])
            .await
            .map_err(map_client_error)
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, RpcError> {
        self.client
            .request("eth_call", rpc_params![request, "latest"])
            .await
            .map_err(map_client_error)
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, RpcError> {
        let gas: U64 = self
            .client
            .request("eth_estimateGas", rpc_params![request])
            .await
            .map_err(map_client_error)?;
        Ok(gas.to::<u64>())
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        let price: U128 = self
            .client
            .request("eth_gasPrice", rpc_params![])
            .await
            .map_err(map_client_error)?;
        Ok(price.to::<u128>())
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        let count: U64 = self
            .client
            .request("eth_getTransactionCount", rpc_params![address, "pending"])
            .await
            .map_err(map_client_error)?;
        Ok(count.to::<u64>())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError> {
        self.client
            .request("eth_sendRawTransaction", rpc_params![raw])
            .await
            .map_err(map_client_error)
    }
}
