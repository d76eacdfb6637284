//! Capacitor event decoding
//!
//! A capacitor emits `MessageAdded(uint256 packetCount, bytes32 newRootHash)` when a
//! message is added to its current packet. The packet counter and root in that event,
//! together with the capacitor's address and the local chain slug, identify the
//! packet that gets sealed.

pub mod errors;

pub use errors::EventError;

use alloy_primitives::{Address, B256, U256};

use crate::abi::{decode_u64, event_topic, word_at};
use crate::chains::ChainSlug;
use crate::packet::{PacketId, PacketIdLayout};
use crate::rpc::{Log, TransactionReceipt};

/// Event signature emitted by capacitors
pub const DEFAULT_EVENT_SIGNATURE: &str = "MessageAdded(uint256,bytes32)";

/// A packet and the root committing to its messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootCommitment {
    pub packet_id: PacketId,
    /// Packed form under the decoder's layout
    pub packed_id: U256,
    pub root_hash: B256,
    /// Transaction that emitted the event
    pub tx_hash: B256,
}

/// Decodes capacitor events for one event signature and packet id layout.
#[derive(Debug, Clone)]
pub struct CapacitorEventDecoder {
    signature: String,
    topic: B256,
    layout: PacketIdLayout,
}

impl Default for CapacitorEventDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_SIGNATURE, PacketIdLayout::DEFAULT)
    }
}

impl CapacitorEventDecoder {
    pub fn new(signature: &str, layout: PacketIdLayout) -> Self {
        Self {
            signature: signature.to_string(),
            topic: event_topic(signature),
            layout,
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn topic(&self) -> B256 {
        self.topic
    }

    fn matches(&self, log: &Log, capacitor: Address) -> bool {
        log.address == capacitor && log.topics.first() == Some(&self.topic)
    }

    /// The commitment of the last matching event in the receipt.
    ///
    /// Only logs emitted by `capacitor` with the decoder's topic are considered. When
    /// one transaction added several messages, the last event carries the newest root.
    pub fn decode_root_commitment(
        &self,
        receipt: &TransactionReceipt,
        capacitor: Address,
        local_slug: ChainSlug,
    ) -> Result<RootCommitment, EventError> {
        let log = receipt
            .logs
            .iter()
            .rev()
            .find(|log| self.matches(log, capacitor))
            .ok_or(EventError::NotFound {
                tx: receipt.transaction_hash,
                capacitor,
            })?;
        self.decode_log(receipt.transaction_hash, log, local_slug)
    }

    /// Every matching event in log order, each decoded on its own.
    ///
    /// A malformed event only fails its own entry. [`EventError::NotFound`] is returned
    /// when the receipt has no matching event at all.
    pub fn decode_all(
        &self,
        receipt: &TransactionReceipt,
        capacitor: Address,
        local_slug: ChainSlug,
    ) -> Result<Vec<Result<RootCommitment, EventError>>, EventError> {
        let decoded: Vec<_> = receipt
            .logs
            .iter()
            .filter(|log| self.matches(log, capacitor))
            .map(|log| self.decode_log(receipt.transaction_hash, log, local_slug))
            .collect();
        if decoded.is_empty() {
            return Err(EventError::NotFound {
                tx: receipt.transaction_hash,
                capacitor,
            });
        }
        Ok(decoded)
    }

    fn decode_log(
        &self,
        tx: B256,
        log: &Log,
        local_slug: ChainSlug,
    ) -> Result<RootCommitment, EventError> {
        let decode_error = |reason: String| EventError::Decode {
            tx,
            log_index: log.log_index,
            reason,
        };

        if log.data.len() != 64 {
            return Err(decode_error(format!(
                "expected 64 bytes of event data, got {}",
                log.data.len()
            )));
        }
        let counter = word_at(&log.data, 0)
            .and_then(decode_u64)
            .ok_or_else(|| decode_error("packet count does not fit 64 bits".to_string()))?;
        let root_hash = word_at(&log.data, 1)
            .map(B256::from_slice)
            .ok_or_else(|| decode_error("missing root hash".to_string()))?;

        let packet_id = PacketId::new(local_slug, log.address, counter);
        let packed_id = packet_id
            .pack_with(&self.layout)
            .map_err(|e| decode_error(e.to_string()))?;

        Ok(RootCommitment {
            packet_id,
            packed_id,
            root_hash,
            tx_hash: tx,
        })
    }
}
