use alloy_signer_local::PrivateKeySigner;
use std::sync::Arc;
use tracing::debug;

use super::{ChainSigner, LocalSigner, RelayService, RelayedSigner, SignerError};
use crate::chains::ChainMeta;
use crate::registry::{roles, ChainAddresses};
use crate::rpc::ChainRpc;

/// Supplies the signer each chain task uses.
pub trait SignerSource: Send + Sync {
    /// Signer for one chain, chosen from its address record.
    fn signer_for(
        &self,
        meta: &ChainMeta,
        addresses: &ChainAddresses,
        rpc: Arc<dyn ChainRpc>,
    ) -> Result<Arc<dyn ChainSigner>, SignerError>;
}

/// Chooses between direct and relayed signing.
///
/// Relayed signing is used when multisig mode was requested and the chain has a
/// `Safe`; every other chain signs directly.
pub struct SignerProvider {
    key: PrivateKeySigner,
    relay: Option<Arc<dyn RelayService>>,
    use_safe: bool,
}

impl std::fmt::Debug for SignerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerProvider")
            .field("address", &self.key.address())
            .field("relay", &self.relay.is_some())
            .field("use_safe", &self.use_safe)
            .finish()
    }
}

impl SignerProvider {
    /// Direct signing on every chain.
    pub fn direct(key: PrivateKeySigner) -> Self {
        Self {
            key,
            relay: None,
            use_safe: false,
        }
    }

    /// Relayed signing on chains with a Safe.
    pub fn with_relay(key: PrivateKeySigner, relay: Arc<dyn RelayService>) -> Self {
        Self {
            key,
            relay: Some(relay),
            use_safe: true,
        }
    }

    /// Multisig requested but no relay configured: chains with a Safe fail with
    /// [`SignerError::MissingRelay`].
    pub fn without_relay(key: PrivateKeySigner, use_safe: bool) -> Self {
        Self {
            key,
            relay: None,
            use_safe,
        }
    }
}

impl SignerSource for SignerProvider {
    fn signer_for(
        &self,
        meta: &ChainMeta,
        addresses: &ChainAddresses,
        rpc: Arc<dyn ChainRpc>,
    ) -> Result<Arc<dyn ChainSigner>, SignerError> {
        let safe = addresses.address(roles::SAFE);
        match (self.use_safe, safe) {
            (true, Some(safe)) => {
                let relay = self.relay.clone().ok_or(SignerError::MissingRelay(meta.slug))?;
                let wrapper = addresses.address(roles::MULTISIG_WRAPPER);
                debug!(target: "signer", chain = %meta.slug, %safe, "Using multisig relay");
                Ok(Arc::new(RelayedSigner::new(
                    self.key.clone(),
                    relay,
                    meta.chain_id,
                    safe,
                    wrapper,
                )))
            }
            _ => Ok(Arc::new(LocalSigner::new(self.key.clone(), rpc, meta.chain_id))),
        }
    }
}
