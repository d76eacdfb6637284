//! Chain Registry
//!
//! Static table of every network the coordinator can drive. A [`ChainSlug`] is the
//! protocol-level chain identifier; it usually equals the native EVM chain id but is
//! not required to (chain ids wider than 32 bits get a dedicated slug).

pub mod table;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use table::CHAINS;

/// Protocol-level chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainSlug(pub u32);

impl ChainSlug {
    /// Raw slug value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChainSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainSlug {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(ChainSlug)
            .map_err(|_| ChainError::InvalidSlug(s.to_string()))
    }
}

impl From<u32> for ChainSlug {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Static metadata for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMeta {
    /// Protocol slug
    pub slug: ChainSlug,
    /// Human-readable network name
    pub name: &'static str,
    /// Native EVM chain id (used for EIP-155 replay protection)
    pub chain_id: u64,
    /// Blocks to wait before an event or transaction is treated as final
    pub confirmations: u64,
    /// Whether this is a test network
    pub is_testnet: bool,
}

/// Chain lookup failures. These are fatal to a whole run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    /// Slug not present in the static table
    #[error("Unknown chain slug {0}")]
    UnknownChain(ChainSlug),

    /// Slug string could not be parsed
    #[error("Invalid chain slug: {0:?}")]
    InvalidSlug(String),
}

/// Read-only view over the static chain table.
#[derive(Debug, Clone, Copy)]
pub struct ChainRegistry {
    chains: &'static [ChainMeta],
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self { chains: CHAINS }
    }
}

impl ChainRegistry {
    /// Registry over a custom table.
    pub const fn with_table(chains: &'static [ChainMeta]) -> Self {
        Self { chains }
    }

    /// Metadata for a slug.
    pub fn lookup(&self, slug: ChainSlug) -> Result<&'static ChainMeta, ChainError> {
        self.chains
            .iter()
            .find(|meta| meta.slug == slug)
            .ok_or(ChainError::UnknownChain(slug))
    }

    /// Metadata for a native chain id.
    pub fn by_chain_id(&self, chain_id: u64) -> Option<&'static ChainMeta> {
        self.chains.iter().find(|meta| meta.chain_id == chain_id)
    }

    /// Whether the slug belongs to a test network.
    pub fn is_testnet(&self, slug: ChainSlug) -> Result<bool, ChainError> {
        self.lookup(slug).map(|meta| meta.is_testnet)
    }

    /// Confirmation depth for a slug.
    pub fn confirmations(&self, slug: ChainSlug) -> Result<u64, ChainError> {
        self.lookup(slug).map(|meta| meta.confirmations)
    }

    /// Every chain in the same network class (testnet or mainnet) except `slug` itself.
    pub fn siblings_of(&self, slug: ChainSlug) -> Result<Vec<ChainSlug>, ChainError> {
        let testnet = self.is_testnet(slug)?;
        Ok(self
            .chains
            .iter()
            .filter(|meta| meta.is_testnet == testnet && meta.slug != slug)
            .map(|meta| meta.slug)
            .collect())
    }

    /// Resolve every slug, failing on the first unknown one.
    pub fn resolve_all(&self, slugs: &[ChainSlug]) -> Result<Vec<&'static ChainMeta>, ChainError> {
        slugs.iter().map(|slug| self.lookup(*slug)).collect()
    }

    /// All known chains.
    pub fn all(&self) -> &'static [ChainMeta] {
        self.chains
    }
}

/// Parse a comma-separated slug list (`"5,80001"`).
pub fn parse_slug_list(input: &str) -> Result<Vec<ChainSlug>, ChainError> {
    input
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(ChainSlug::from_str)
        .collect()
}
