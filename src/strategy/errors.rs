use thiserror::Error;

use crate::chains::ChainSlug;

/// Every failure of one chain's configuration, collected.
/// A failed chain never aborts its siblings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Chain {chain} failed: {}", .failures.join("; "))]
pub struct ChainConfigurationError {
    /// Failing chain
    pub chain: ChainSlug,
    /// One entry per failed step
    pub failures: Vec<String>,
}
