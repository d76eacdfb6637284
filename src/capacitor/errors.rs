use alloy_primitives::{Address, B256};
use thiserror::Error;

/// Errors extracting a root commitment from a receipt
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// No log from the capacitor with the expected topic
    #[error("No capacitor event from {capacitor} in transaction {tx}")]
    NotFound { tx: B256, capacitor: Address },

    /// A matching log whose payload is malformed
    #[error("Malformed capacitor event in transaction {tx} (log {log_index:?}): {reason}")]
    Decode {
        tx: B256,
        log_index: Option<u64>,
        reason: String,
    },
}
