use alloy_primitives::Bytes;
use thiserror::Error;

use crate::chains::ChainSlug;

/// Errors talking to a chain's JSON-RPC endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Execution reverted; `data` carries the revert payload when the node returned one
    #[error("Execution reverted: {message}")]
    Reverted {
        /// Node-provided message
        message: String,
        /// Raw revert data (custom error selector + args)
        data: Bytes,
    },

    /// JSON-RPC error object other than a revert
    #[error("RPC error {code}: {message}")]
    Call {
        /// JSON-RPC error code
        code: i32,
        /// Error message
        message: String,
    },

    /// Connection or transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No endpoint configured for the chain
    #[error("No RPC endpoint configured for chain {0}")]
    MissingEndpoint(ChainSlug),
}

impl RpcError {
    /// Revert payload, if this error is a revert.
    pub fn revert_data(&self) -> Option<&Bytes> {
        match self {
            RpcError::Reverted { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Whether the revert payload starts with one of `selectors`.
    pub fn is_revert_with(&self, selectors: &[[u8; 4]]) -> bool {
        self.revert_data()
            .filter(|data| data.len() >= 4)
            .is_some_and(|data| selectors.iter().any(|sel| data[..4] == sel[..]))
    }
}
