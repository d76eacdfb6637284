//! Transaction and digest signing
//!
//! Every chain task gets one [`ChainSigner`]. It is chosen once per chain per run by
//! [`SignerProvider`]:
//! - direct: a local key signs and broadcasts raw transactions ([`LocalSigner`])
//! - relayed: transactions go through a multisig relay service on behalf of the
//!   chain's Safe ([`RelayedSigner`])
//!
//! Digest signing always uses the local key.

pub mod errors;
pub mod local;
pub mod provider;
pub mod relay;

pub use errors::SignerError;
pub use local::LocalSigner;
pub use provider::{SignerProvider, SignerSource};
pub use relay::{HttpRelay, RelayRequest, RelayService, RelayedSigner};

use alloy_primitives::{Address, Bytes, Signature, B256, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::fmt;

/// How a signer submits transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerMode {
    /// Signed and broadcast with the local key
    Direct,
    /// Forwarded to a multisig relay
    Relayed,
}

impl fmt::Display for SignerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerMode::Direct => write!(f, "direct"),
            SignerMode::Relayed => write!(f, "multisig relay"),
        }
    }
}

/// A contract call to be sent as a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Target contract
    pub to: Address,
    /// Calldata
    pub data: Bytes,
    /// Native value attached
    pub value: U256,
}

impl TxRequest {
    /// Value-less call.
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
        }
    }
}

/// Per-chain signing capability.
#[async_trait]
pub trait ChainSigner: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> Address;

    /// Submission mode.
    fn mode(&self) -> SignerMode;

    /// Sign a 32-byte digest with Ethereum personal-message semantics.
    ///
    /// The raw digest bytes are the message; they are not ABI re-encoded.
    /// Returns the 65-byte `r || s || v` signature with `v` in {27, 28}.
    async fn sign_digest(&self, digest: B256) -> Result<Bytes, SignerError>;

    /// Send a transaction and return its hash once broadcast.
    async fn send_transaction(&self, tx: TxRequest) -> Result<B256, SignerError>;
}

/// Parse a hex private key (with or without `0x`).
pub fn parse_private_key(private_key_hex: &str) -> Result<PrivateKeySigner, SignerError> {
    let clean_hex = private_key_hex
        .trim()
        .strip_prefix("0x")
        .unwrap_or(private_key_hex.trim());
    clean_hex
        .parse::<PrivateKeySigner>()
        .map_err(|_| SignerError::InvalidPrivateKey)
}

/// Personal-message signature over raw digest bytes.
pub(crate) async fn sign_digest_with(
    key: &PrivateKeySigner,
    digest: B256,
) -> Result<Bytes, SignerError> {
    let signature = key
        .sign_message(digest.as_slice())
        .await
        .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
    Ok(Bytes::copy_from_slice(&signature_to_bytes(&signature)))
}

/// Convert a signature to bytes (r || s || v) with `v` in {27, 28}.
pub fn signature_to_bytes(sig: &Signature) -> [u8; 65] {
    let mut bytes = [0u8; 65];
    bytes[..32].copy_from_slice(&sig.r().to_be_bytes::<32>());
    bytes[32..64].copy_from_slice(&sig.s().to_be_bytes::<32>());
    bytes[64] = 27 + sig.v() as u8;
    bytes
}

/// Convert 65 signature bytes back into a signature.
pub fn bytes_to_signature(bytes: &[u8]) -> Result<Signature, SignerError> {
    if bytes.len() != 65 {
        return Err(SignerError::SigningFailed(format!(
            "Invalid signature length: expected 65, got {}",
            bytes.len()
        )));
    }
    Signature::try_from(bytes)
        .map_err(|e| SignerError::SigningFailed(format!("Invalid signature: {e}")))
}
