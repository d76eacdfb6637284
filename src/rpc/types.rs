use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// `eth_call` / `eth_estimateGas` request object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

impl CallRequest {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { from: None, to, data }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

/// Log entry of a transaction receipt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default, with = "quantity::opt")]
    pub log_index: Option<u64>,
}

/// Subset of `eth_getTransactionReceipt` the coordinator reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default, with = "quantity::opt")]
    pub block_number: Option<u64>,
    /// 1 on success, 0 on revert (post-Byzantium)
    #[serde(default, with = "quantity::opt")]
    pub status: Option<u64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Whether the transaction executed without reverting.
    pub fn succeeded(&self) -> bool {
        self.status.unwrap_or(1) == 1
    }

    /// Number of blocks on top of (and including) the receipt's block.
    pub fn confirmations_at(&self, head: u64) -> u64 {
        match self.block_number {
            Some(block) if head >= block => head - block + 1,
            _ => 0,
        }
    }
}

/// Hex quantity (`"0x1a"`) serde helpers.
pub(crate) mod quantity {
    pub mod opt {
        use alloy_primitives::U64;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(U64::from).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            Ok(Option::<U64>::deserialize(deserializer)?.map(|v| v.to::<u64>()))
        }
    }
}
