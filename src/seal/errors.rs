use alloy_primitives::B256;
use thiserror::Error;

use super::SealStage;
use crate::capacitor::EventError;
use crate::packet::PacketId;
use crate::rpc::ConfirmationError;
use crate::signer::SignerError;

/// Sealing failures
#[derive(Debug, Error)]
pub enum SealError {
    /// The notary already holds a seal for this packet
    #[error("Packet {0} is already sealed")]
    AlreadySealed(PacketId),

    /// Seal transaction reverted, was dropped, or timed out. Never retried automatically.
    #[error("Seal transaction {tx} not confirmed: {reason}")]
    NotConfirmed {
        tx: B256,
        #[source]
        reason: ConfirmationError,
    },

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Event(#[from] EventError),

    /// The source transaction carrying the capacitor event is not final
    #[error("Source transaction {tx} not confirmed: {reason}")]
    SourceNotConfirmed {
        tx: B256,
        #[source]
        reason: ConfirmationError,
    },

    /// A step was applied to a state it does not follow
    #[error("Cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: SealStage, to: SealStage },
}
