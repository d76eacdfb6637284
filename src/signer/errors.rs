use thiserror::Error;

use crate::chains::ChainSlug;
use crate::rpc::RpcError;

/// Errors that can occur during signing or transaction submission
#[derive(Debug, Error)]
pub enum SignerError {
    /// Invalid private key format
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing operation failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Chain RPC rejected a request (including simulated reverts)
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Multisig relay rejected or failed the request; reverts keep their data
    #[error("Relay error: {0}")]
    Relay(RpcError),

    /// Multisig mode requested for a chain with a Safe but no relay configured
    #[error("Chain {0} is owned by a Safe but no relay service is configured")]
    MissingRelay(ChainSlug),
}

impl SignerError {
    /// The underlying RPC error, if any, from the chain or the relay.
    pub fn rpc(&self) -> Option<&RpcError> {
        match self {
            SignerError::Rpc(err) | SignerError::Relay(err) => Some(err),
            _ => None,
        }
    }
}
