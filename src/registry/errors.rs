use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or persisting the address registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry file does not exist
    #[error("Address registry not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Filesystem failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed registry document
    #[error("Invalid address registry {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Registry could not be rendered
    #[error("Failed to serialize address registry: {0}")]
    Serialize(#[from] serde_json::Error),
}
